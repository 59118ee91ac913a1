//! Film location CSV loading and table construction.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use tracing::info;

use sfmovies::models::{movie_key, Geometry, IndexedLocation, MovieInfo, MovieLocation};
use sfmovies::store::{LocationTable, MovieTable};

use crate::geocode::Coordinates;
use crate::parse::ParsedLocation;

/// One row of the DataSF "Film Locations in San Francisco" export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilmLocationRow {
    pub title: String,
    pub year: String,
    pub location: String,
    pub fun_fact: String,
    pub production_company: String,
    pub director: String,
    pub actor1: String,
    pub actor2: String,
    pub actor3: String,
}

/// Load rows from a CSV file, decompressing `.gz` files on the fly
pub fn load_rows(path: &Path) -> Result<Vec<FilmLocationRow>> {
    info!("Loading film locations from {}", path.display());

    let file = File::open(path).context("Failed to open film locations file")?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let rows = read_rows(reader)?;
    info!("Loaded {} film location rows", rows.len());
    Ok(rows)
}

/// Parse CSV rows; columns are found by header name
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<FilmLocationRow>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("Column '{}' not found", name))
    };

    let title = column("Title")?;
    let year = column("Release Year")?;
    let location = column("Locations")?;
    let fun_fact = column("Fun Facts")?;
    let production_company = column("Production Company")?;
    let director = column("Director")?;
    let actors = [column("Actor 1")?, column("Actor 2")?, column("Actor 3")?];

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let get = |i: usize| field(&record, i);
        rows.push(FilmLocationRow {
            title: get(title),
            year: get(year),
            location: get(location),
            fun_fact: get(fun_fact),
            production_company: get(production_company),
            director: get(director),
            actor1: get(actors[0]),
            actor2: get(actors[1]),
            actor3: get(actors[2]),
        });
    }

    Ok(rows)
}

fn field(record: &StringRecord, i: usize) -> String {
    record.get(i).unwrap_or_default().to_string()
}

/// Movies and the raw `(description, note)` pairs recorded for each
#[derive(Debug, Default)]
pub struct Catalog {
    pub movies: MovieTable,
    pub descriptions: BTreeMap<String, Vec<(String, String)>>,
}

impl Catalog {
    /// Group rows by movie key; the first row of a movie supplies its metadata.
    pub fn build(rows: Vec<FilmLocationRow>) -> Self {
        let mut catalog = Catalog::default();

        for row in rows {
            let key = movie_key(&row.title, &row.year);
            catalog
                .movies
                .entry(key.clone())
                .or_insert_with(|| MovieInfo {
                    title: row.title.clone(),
                    year: row.year.clone(),
                    production_company: row.production_company.clone(),
                    director: row.director.clone(),
                    actor1: row.actor1.clone(),
                    actor2: row.actor2.clone(),
                    actor3: row.actor3.clone(),
                });
            catalog
                .descriptions
                .entry(key)
                .or_default()
                .push((row.location, row.fun_fact));
        }

        info!(
            "Catalog has {} movies with {} locations",
            catalog.movies.len(),
            catalog.descriptions.values().map(Vec::len).sum::<usize>()
        );
        catalog
    }

    /// Every distinct location description
    pub fn unique_descriptions(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = self
            .descriptions
            .values()
            .flatten()
            .map(|(desc, _)| desc.as_str())
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen.into_iter()
    }

    /// Attach coordinates to every location.
    ///
    /// `parsed` must cover every description and `coords` every parsed address.
    pub fn locate(
        &self,
        parsed: &BTreeMap<String, ParsedLocation>,
        coords: &Coordinates,
    ) -> Result<LocationTable> {
        let mut table = LocationTable::new();

        for (key, locations) in &self.descriptions {
            let mut located = Vec::with_capacity(locations.len());
            for (description, note) in locations {
                let parsed_location = parsed
                    .get(description)
                    .with_context(|| format!("Description '{}' was not parsed", description))?;
                let geometry = geometry_for(parsed_location, coords).with_context(|| {
                    format!("No coordinates for location '{}'", description)
                })?;
                located.push(MovieLocation {
                    description: description.clone(),
                    note: note.clone(),
                    geometry,
                });
            }
            table.insert(key.clone(), located);
        }

        Ok(table)
    }
}

fn geometry_for(parsed: &ParsedLocation, coords: &Coordinates) -> Option<Geometry> {
    match parsed {
        ParsedLocation::Single(addr) => {
            let (lat, lng) = *coords.get(addr.as_str())?;
            Geometry::try_from(vec![lat, lng]).ok()
        }
        ParsedLocation::Range(from, to) => {
            let (lat1, lng1) = *coords.get(from.as_str())?;
            let (lat2, lng2) = *coords.get(to.as_str())?;
            Geometry::try_from(vec![lat1, lng1, lat2, lng2]).ok()
        }
    }
}

/// Flatten all movie locations into one array sorted by latitude.
///
/// Movies are visited in key order and the sort is stable, so the output is
/// deterministic for a given input.
pub fn sort_by_latitude(locations: &LocationTable) -> Vec<IndexedLocation> {
    let mut flat: Vec<IndexedLocation> = locations
        .iter()
        .flat_map(|(key, locs)| {
            locs.iter()
                .map(move |loc| IndexedLocation::new(key.clone(), loc.clone()))
        })
        .collect();
    flat.sort_by(|a, b| a.latitude.total_cmp(&b.latitude));
    flat
}

/// Write the sorted movie keys as a script fragment for the front end's autocomplete:
///
/// ```text
/// <script>
///    Movie_Keys = [
///             "180 (2011)",
///             ...
///           ];
/// </script>
/// ```
pub fn write_movie_keys<'a>(keys: impl IntoIterator<Item = &'a String>, path: &Path) -> Result<()> {
    let quoted = keys
        .into_iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;

    let mut file = File::create(path).context("Failed to create movie keys file")?;
    writeln!(file, "<script>")?;
    writeln!(file, "   Movie_Keys = [")?;
    if !quoted.is_empty() {
        writeln!(
            file,
            "{}",
            quoted
                .iter()
                .map(|k| format!("            {}", k))
                .collect::<Vec<_>>()
                .join(",\n")
        )?;
    }
    writeln!(file, "          ];")?;
    writeln!(file, "</script>")?;

    info!("Wrote {} movie keys to {}", quoted.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::LocationParser;

    const CSV: &str = "\
Title,Release Year,Locations,Fun Facts,Production Company,Distributor,Director,Writer,Actor 1,Actor 2,Actor 3
About a Boy,2014,Crissy Field,,NBC Studios,NBCUniversal,Mark J. Kunerth,Jason Katims,David Walton,Minnie Driver,
About a Boy,2014,Powell from Bush and Sutter,,NBC Studios,NBCUniversal,Mark J. Kunerth,Jason Katims,David Walton,Minnie Driver,
Dream with the Fishes,1997,Bay Bridge,\"Before opening in 1936, the bridge was blessed.\",Sony Pictures Classics,,Finn Taylor,Finn Taylor,David Arquette,Brad Hunt,
Dream with the Fishes,1997,Pier 39,,Sony Pictures Classics,,Finn Taylor,Finn Taylor,David Arquette,Brad Hunt,
";

    fn coords() -> Coordinates {
        let mut coords = Coordinates::new();
        coords.insert("Crissy Field".into(), (37.8039069, -122.4640618));
        coords.insert("Powell and Bush".into(), (37.790228, -122.408582));
        coords.insert("Powell and Sutter".into(), (37.789328, -122.408482));
        coords.insert("Bay Bridge".into(), (37.7983, -122.3778));
        coords.insert("Pier 39".into(), (37.808673, -122.409821));
        coords
    }

    #[test]
    fn test_read_rows() {
        let rows = read_rows(CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].title, "About a Boy");
        assert_eq!(rows[0].year, "2014");
        assert_eq!(rows[0].location, "Crissy Field");
        assert_eq!(rows[0].director, "Mark J. Kunerth");
        assert_eq!(rows[0].actor3, "");
        assert_eq!(
            rows[2].fun_fact,
            "Before opening in 1936, the bridge was blessed."
        );
    }

    #[test]
    fn test_read_rows_requires_columns() {
        let err = read_rows("Title,Locations\nX,Y\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Release Year"));
    }

    #[test]
    fn test_build_catalog() {
        let catalog = Catalog::build(read_rows(CSV.as_bytes()).unwrap());

        assert_eq!(catalog.movies.len(), 2);
        let info = &catalog.movies["About a Boy (2014)"];
        assert_eq!(info.production_company, "NBC Studios");
        assert_eq!(info.actor2, "Minnie Driver");

        assert_eq!(
            catalog.descriptions["Dream with the Fishes (1997)"],
            vec![
                (
                    "Bay Bridge".to_string(),
                    "Before opening in 1936, the bridge was blessed.".to_string()
                ),
                ("Pier 39".to_string(), String::new()),
            ]
        );
        assert_eq!(catalog.unique_descriptions().count(), 4);
    }

    #[test]
    fn test_locate_and_sort() {
        let parser = LocationParser::new();
        let catalog = Catalog::build(read_rows(CSV.as_bytes()).unwrap());
        let parsed: BTreeMap<String, ParsedLocation> = catalog
            .unique_descriptions()
            .map(|d| (d.to_string(), parser.parse(d)))
            .collect();

        let table = catalog.locate(&parsed, &coords()).unwrap();
        let about_a_boy = &table["About a Boy (2014)"];
        assert_eq!(
            about_a_boy[1].geometry,
            Geometry::segment(37.790228, -122.408582, 37.789328, -122.408482)
        );

        let flat = sort_by_latitude(&table);
        let order: Vec<&str> = flat.iter().map(|l| l.description.as_str()).collect();
        assert_eq!(
            order,
            vec!["Powell from Bush and Sutter", "Bay Bridge", "Crissy Field", "Pier 39"]
        );
        assert!(flat.windows(2).all(|w| w[0].latitude <= w[1].latitude));
    }

    #[test]
    fn test_locate_reports_missing_coordinates() {
        let parser = LocationParser::new();
        let catalog = Catalog::build(read_rows(CSV.as_bytes()).unwrap());
        let parsed: BTreeMap<String, ParsedLocation> = catalog
            .unique_descriptions()
            .map(|d| (d.to_string(), parser.parse(d)))
            .collect();

        let mut partial = coords();
        partial.remove("Pier 39");
        assert!(catalog.locate(&parsed, &partial).is_err());
    }

    #[test]
    fn test_locate_rejects_non_finite_coordinates() {
        let parser = LocationParser::new();
        let catalog = Catalog::build(read_rows(CSV.as_bytes()).unwrap());
        let parsed: BTreeMap<String, ParsedLocation> = catalog
            .unique_descriptions()
            .map(|d| (d.to_string(), parser.parse(d)))
            .collect();

        let mut bad = coords();
        bad.insert("Powell and Sutter".into(), (f64::NAN, -122.408482));
        let err = catalog.locate(&parsed, &bad).unwrap_err();
        assert!(err.to_string().contains("Powell from Bush and Sutter"));
    }

    #[test]
    fn test_write_movie_keys_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie_keys.html");

        write_movie_keys(&Vec::<String>::new(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "<script>\n   Movie_Keys = [\n          ];\n</script>\n");
    }

    #[test]
    fn test_write_movie_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie_keys.html");
        let keys = vec!["180 (2011)".to_string(), "Ocean's \"11\" (2001)".to_string()];

        write_movie_keys(&keys, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "<script>\n   Movie_Keys = [\n            \"180 (2011)\",\n            \"Ocean's \\\"11\\\" (2001)\"\n          ];\n</script>\n"
        );
    }
}

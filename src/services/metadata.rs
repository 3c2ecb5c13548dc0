use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::models::{ItemId, MovieDetails, MovieRecord};

/// Display metadata keyed by item id
///
/// Only the presentation side reads this; ranking never touches it.
#[derive(Debug, Default)]
pub struct MovieMetadata {
    movies: HashMap<ItemId, MovieDetails>,
}

impl MovieMetadata {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the semicolon-delimited metadata file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open metadata {}: {}", path.display(), e))?;
        let metadata = Self::from_reader(file)?;

        tracing::info!(path = %path.display(), movies = metadata.len(), "Movie metadata loaded");

        Ok(metadata)
    }

    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut movies = HashMap::new();
        for result in csv_reader.deserialize::<MovieRecord>() {
            let movie = MovieDetails::from(result?);
            movies.insert(movie.id, movie);
        }

        Ok(Self { movies })
    }

    pub fn get(&self, id: ItemId) -> Option<&MovieDetails> {
        self.movies.get(&id)
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "ID;Title;Year;IMDb;Duration;Director;Actor;Genre;Keywords\n\
                          1;Alien;1979;8.5;117;Ridley Scott;Sigourney Weaver;Horror|Sci-Fi;space|android\n\
                          2;Heat;1995;8.3;170;Michael Mann;Al Pacino;Crime;heist\n";

    #[test]
    fn test_load_metadata() {
        let metadata = MovieMetadata::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(metadata.len(), 2);

        let alien = metadata.get(ItemId(1)).unwrap();
        assert_eq!(alien.title, "Alien");
        assert_eq!(alien.genres, vec!["Horror", "Sci-Fi"]);
        assert_eq!(alien.keywords, vec!["space", "android"]);
        assert!(metadata.get(ItemId(3)).is_none());
    }

    #[test]
    fn test_bad_id_fails() {
        let data = "ID;Title\nabc;Alien\n";
        assert!(MovieMetadata::from_reader(data.as_bytes()).is_err());
    }
}

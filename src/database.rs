//! This module provides the ion database and utilities for loading it from TOML files.
//!
//! Each record lives in an `[ions."name"]` table and carries the same fields as the serialized
//! form of an [`Ion`]. Names are stored lowercase; lookups ignore case and also resolve the
//! alternate names listed in a record's `alias` array. Records are validated only when they are
//! turned into an `Ion`, so a single malformed entry does not prevent the rest of the database
//! from being used.

use crate::error::IonizeError;
use crate::ion::{Ion, IonRecord};
use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

/// A collection of ion records indexed by lowercase name and alias.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Database {
    records: BTreeMap<String, IonRecord>,
    aliases: HashMap<String, String>,
}

#[derive(Deserialize)]
struct DatabaseFile {
    #[serde(deserialize_with = "deserialize_ion_map")]
    ions: BTreeMap<String, IonRecord>,
}

impl Database {
    /// Loads an ion database from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::IoError` if the file cannot be read, or
    /// `IonizeError::DeserializationError` if the content is not a valid database.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ionize::Database;
    /// use std::path::Path;
    ///
    /// let database = Database::load_from_file(Path::new("ions.toml")).unwrap();
    /// ```
    pub fn load_from_file(path: &Path) -> Result<Self, IonizeError> {
        let content = std::fs::read_to_string(path).map_err(|io_error| IonizeError::IoError {
            path: path.to_path_buf(),
            source: io_error,
        })?;

        Self::load_from_str(&content)
    }

    /// Parses an ion database from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::DeserializationError` if the content is not valid TOML, a record is
    /// missing a required field, or two keys differ only by case.
    ///
    /// # Examples
    ///
    /// ```
    /// use ionize::Database;
    ///
    /// let toml_data = r#"
    /// [ions."acetic acid"]
    /// valence = [-1]
    /// reference_pKa = [4.756]
    /// reference_mobility = [-42.4e-9]
    /// alias = ["acetate"]
    /// "#;
    ///
    /// let database = Database::load_from_str(toml_data).unwrap();
    /// assert_eq!(database.len(), 1);
    /// assert_eq!(database.load("Acetate").unwrap().name(), "acetic acid");
    /// ```
    pub fn load_from_str(toml_str: &str) -> Result<Self, IonizeError> {
        let file: DatabaseFile = toml::from_str(toml_str)?;
        let mut database = Self::new();
        for (key, record) in file.ions {
            database.insert_record(key, record);
        }
        Ok(database)
    }

    /// Creates an empty database.
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Adds an ion, replacing any record with the same name.
    pub fn insert(&mut self, ion: Ion) {
        let key = ion.name().to_lowercase();
        self.insert_record(key, IonRecord::from(ion));
    }

    fn insert_record(&mut self, key: String, record: IonRecord) {
        for alias in record.alias.iter().flatten() {
            self.aliases.insert(alias.to_lowercase(), key.clone());
        }
        self.records.insert(key, record);
    }

    /// Builds the named ion, matching names and aliases without regard to case.
    ///
    /// # Errors
    ///
    /// Returns `IonizeError::SpeciesNotFound` if nothing matches `name`, or
    /// `IonizeError::InvalidSpecies` if the stored record fails validation.
    pub fn load(&self, name: &str) -> Result<Ion, IonizeError> {
        let key = name.to_lowercase();
        let record = self
            .records
            .get(&key)
            .or_else(|| {
                self.aliases
                    .get(&key)
                    .and_then(|target| self.records.get(target))
            })
            .ok_or_else(|| IonizeError::SpeciesNotFound(name.to_string()))?;

        Ion::try_from(record.clone())
    }

    /// Returns the names of all records whose name or alias contains `pattern`, ignoring case.
    ///
    /// The result is sorted and contains each record name once.
    pub fn search(&self, pattern: &str) -> Vec<String> {
        let pattern = pattern.to_lowercase();
        let mut found: BTreeSet<&str> = self
            .records
            .keys()
            .filter(|name| name.contains(&pattern))
            .map(String::as_str)
            .collect();
        found.extend(
            self.aliases
                .iter()
                .filter(|(alias, _)| alias.contains(&pattern))
                .map(|(_, name)| name.as_str()),
        );
        found.into_iter().map(str::to_string).collect()
    }

    /// Returns true if `name` resolves to a record.
    pub fn contains(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        self.records.contains_key(&key) || self.aliases.contains_key(&key)
    }

    /// Iterates over record names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Deserializes the `[ions]` table, lowercasing keys and filling in missing record names.
fn deserialize_ion_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, IonRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    struct IonMapVisitor;

    impl<'de> Visitor<'de> for IonMapVisitor {
        type Value = BTreeMap<String, IonRecord>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map from ion name to ion record")
        }

        fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut ions = BTreeMap::new();
            while let Some((key, mut record)) = map.next_entry::<String, IonRecord>()? {
                if record.name.is_empty() {
                    record.name = key.clone();
                }
                let lowercase = key.to_lowercase();
                if ions.insert(lowercase, record).is_some() {
                    return Err(de::Error::custom(format!("duplicate ion key: '{}'", key)));
                }
            }
            Ok(ions)
        }
    }

    deserializer.deserialize_map(IonMapVisitor)
}

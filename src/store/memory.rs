use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::{ConfigStore, StoreError, StoreResult, Value};

type Fields = BTreeMap<String, Value>;
type Tables = BTreeMap<String, BTreeMap<String, Fields>>;

/// In-memory configuration store
///
/// Tables are loaded from TOML templates made of `[[table]]` entries:
/// ```toml
/// [[table]]
/// name = "GEO"
/// index = "shield"
/// steel_thickness = 0.006
/// detector_size = 20.0
/// ```
/// `index` is optional and defaults to the empty string, every other key is a field of the table.
/// If a table is loaded twice, the fields of the second entry are merged into the first one.
///
/// Templates only provide defaults: a field set with [ConfigStore::set_field] (or any of the
/// typed setters) takes precedence over the same field loaded from a template, whatever the
/// order of the calls.
///
/// Templates are looked up first as a file path, then in the store data directory
/// and finally in the directory given by the environment variable `PMT_COVERAGE_DATA`.
///
/// # Examples
///
/// ```
/// use pmt_coverage::{ConfigStore, MemoryStore};
/// let mut store = MemoryStore::new();
/// store.load_str("inline", r#"
/// [[table]]
/// name = "DETECTOR"
/// photocathode_coverage = 0.2
/// "#).unwrap();
/// assert_eq!(store.get_d("DETECTOR", "", "photocathode_coverage").unwrap(), 0.2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    defaults: Tables,
    overrides: Tables,
    data_dir: Option<PathBuf>,
}
/// Two stores are equal if they resolve every field to the same value
impl PartialEq for MemoryStore {
    fn eq(&self, other: &Self) -> bool {
        self.resolved() == other.resolved()
    }
}

#[derive(Deserialize, Serialize)]
struct Template {
    #[serde(default)]
    table: Vec<toml::Table>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Default::default()
    }
    /// Sets the directory where templates are looked up
    pub fn data_dir<P: AsRef<Path>>(self, data_dir: P) -> Self {
        Self {
            data_dir: Some(data_dir.as_ref().to_path_buf()),
            ..self
        }
    }
    /// Returns the number of tables in the store
    pub fn len(&self) -> usize {
        self.resolved().values().map(|indices| indices.len()).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Template defaults with the overrides applied
    fn resolved(&self) -> Tables {
        let mut tables = self.defaults.clone();
        for (name, indices) in &self.overrides {
            let table = tables.entry(name.clone()).or_default();
            for (index, fields) in indices {
                table
                    .entry(index.clone())
                    .or_default()
                    .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        tables
    }
    fn template_path(&self, template: &str) -> StoreResult<PathBuf> {
        let path = Path::new(template);
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        let data_dir = match &self.data_dir {
            Some(data_dir) => data_dir.clone(),
            None => env::var("PMT_COVERAGE_DATA")
                .map(PathBuf::from)
                .map_err(|e| StoreError::EnvVar(template.into(), e))?,
        };
        let path = data_dir.join(template);
        if path.is_file() {
            Ok(path)
        } else {
            Err(StoreError::TemplatePath(path.display().to_string()))
        }
    }
    /// Loads the tables of a TOML template given as a string
    ///
    /// `name` is only used to identify the template in error messages.
    /// Nothing is added to the store if any of the entries is invalid.
    pub fn load_str(&mut self, name: &str, toml: &str) -> StoreResult<usize> {
        let template: Template = toml::from_str(toml)?;
        let mut tables = Vec::with_capacity(template.table.len());
        for (k, mut entry) in template.table.into_iter().enumerate() {
            let invalid = |msg: String| StoreError::Entry(k, name.into(), msg);
            let table = match entry.remove("name") {
                Some(toml::Value::String(table)) => table,
                Some(_) => return Err(invalid("`name` must be a string".into())),
                None => return Err(invalid("missing `name`".into())),
            };
            let index = match entry.remove("index") {
                Some(toml::Value::String(index)) => index,
                Some(_) => return Err(invalid("`index` must be a string".into())),
                None => String::new(),
            };
            let mut fields = Fields::new();
            for (field, value) in entry {
                let value = from_toml(value)
                    .ok_or_else(|| invalid(format!("unsupported value for field `{field}`")))?;
                fields.insert(field, value);
            }
            tables.push((table, index, fields));
        }
        if tables.is_empty() {
            return Err(StoreError::EmptyTemplate(name.into()));
        }
        let n_table = tables.len();
        for (table, index, fields) in tables {
            self.defaults
                .entry(table)
                .or_default()
                .entry(index)
                .or_default()
                .extend(fields);
        }
        log::debug!("loaded {n_table} tables from {name}");
        Ok(n_table)
    }
    /// Serializes the whole store into a TOML template
    pub fn to_toml(&self) -> StoreResult<String> {
        let tables = self.resolved();
        let mut table = Vec::with_capacity(self.len());
        for (name, indices) in &tables {
            for (index, fields) in indices {
                let mut entry = toml::Table::new();
                entry.insert("name".into(), toml::Value::String(name.clone()));
                if !index.is_empty() {
                    entry.insert("index".into(), toml::Value::String(index.clone()));
                }
                for (field, value) in fields {
                    entry.insert(field.clone(), toml::Value::try_from(value)?);
                }
                table.push(entry);
            }
        }
        Ok(toml::to_string_pretty(&Template { table })?)
    }
}

fn from_toml(value: toml::Value) -> Option<Value> {
    use toml::Value::*;
    match value {
        Integer(value) => Some(Value::Int(value)),
        Float(value) => Some(Value::Double(value)),
        String(value) => Some(Value::Str(value)),
        Boolean(value) => Some(Value::Int(value as i64)),
        Array(values) => {
            // an empty array has no element type, int arrays are also readable as doubles
            if values.iter().all(|x| x.is_integer()) {
                values
                    .into_iter()
                    .map(|x| x.as_integer())
                    .collect::<Option<Vec<i64>>>()
                    .map(Value::IntArray)
            } else {
                values
                    .into_iter()
                    .map(|x| match x {
                        Integer(value) => Some(value as f64),
                        Float(value) => Some(value),
                        _ => None,
                    })
                    .collect::<Option<Vec<f64>>>()
                    .map(Value::DoubleArray)
            }
        }
        _ => None,
    }
}

impl ConfigStore for MemoryStore {
    fn field(&self, table: &str, index: &str, field: &str) -> Option<&Value> {
        self.overrides
            .get(table)
            .and_then(|indices| indices.get(index))
            .and_then(|fields| fields.get(field))
            .or_else(|| self.defaults.get(table)?.get(index)?.get(field))
    }
    fn set_field(&mut self, table: &str, index: &str, field: &str, value: Value) {
        self.overrides
            .entry(table.into())
            .or_default()
            .entry(index.into())
            .or_default()
            .insert(field.into(), value);
    }
    fn has_table(&self, table: &str, index: &str) -> bool {
        [&self.defaults, &self.overrides].into_iter().any(|tables| {
            tables
                .get(table)
                .is_some_and(|indices| indices.contains_key(index))
        })
    }
    fn load(&mut self, template: &str) -> StoreResult<usize> {
        let path = self.template_path(template)?;
        let toml = fs::read_to_string(&path).map_err(|e| StoreError::Read(e, path.clone()))?;
        self.load_str(template, &toml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"
[[table]]
name = "GEO"
index = "shield"
steel_thickness = 0.006
cols = 3
enable = true

[[table]]
name = "PMT"
index = "r7081"
rho_edge = [0, 0.1, 0.254]

[[table]]
name = "PMTINFO"
type = [1, 1, 2]
"#;

    #[test]
    fn load_from_str() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load_str("test", TEMPLATE).unwrap(), 3);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get_d("GEO", "shield", "steel_thickness").unwrap(), 0.006);
        assert_eq!(store.get_i("GEO", "shield", "cols").unwrap(), 3);
        assert_eq!(store.get_i("GEO", "shield", "enable").unwrap(), 1);
        assert_eq!(
            store.get_darray("PMT", "r7081", "rho_edge").unwrap(),
            vec![0.0, 0.1, 0.254]
        );
        assert_eq!(store.get_iarray("PMTINFO", "", "type").unwrap(), vec![1, 1, 2]);
    }

    #[test]
    fn invalid_entry_leaves_store_untouched() {
        let mut store = MemoryStore::new();
        let err = store
            .load_str(
                "bad",
                r#"
[[table]]
name = "GEO"
index = "shield"
detector_size = 20.0

[[table]]
index = "veto_pmts"
"#,
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Entry(1, _, _)));
        assert!(store.is_empty());
    }

    #[test]
    fn empty_template() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.load_str("empty", "# nothing here\n"),
            Err(StoreError::EmptyTemplate(_))
        ));
    }

    #[test]
    fn missing_template() {
        let mut store = MemoryStore::new().data_dir(env::temp_dir());
        assert!(matches!(
            store.load("no/such/template.geo"),
            Err(StoreError::TemplatePath(_))
        ));
    }

    #[test]
    fn merge_and_override() {
        let mut store = MemoryStore::new();
        store.load_str("test", TEMPLATE).unwrap();
        store
            .load_str(
                "override",
                r#"
[[table]]
name = "GEO"
index = "shield"
cols = 5
"#,
            )
            .unwrap();
        assert_eq!(store.get_i("GEO", "shield", "cols").unwrap(), 5);
        assert_eq!(store.get_d("GEO", "shield", "steel_thickness").unwrap(), 0.006);
    }

    #[test]
    fn set_fields_win_over_templates() {
        let mut store = MemoryStore::new();
        store.set_d("GEO", "shield", "detector_size", 16.0);
        store.set_i("GEO", "shield", "cols", 7);
        store.load_str("test", TEMPLATE).unwrap();
        assert_eq!(store.get_d("GEO", "shield", "detector_size").unwrap(), 16.0);
        assert_eq!(store.get_i("GEO", "shield", "cols").unwrap(), 7);
        assert_eq!(store.get_d("GEO", "shield", "steel_thickness").unwrap(), 0.006);

        store.set_i("GEO", "shield", "cols", 9);
        store.load_str("test", TEMPLATE).unwrap();
        assert_eq!(store.get_i("GEO", "shield", "cols").unwrap(), 9);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn toml_round_trip() {
        let mut store = MemoryStore::new();
        store.load_str("test", TEMPLATE).unwrap();
        store.set_d("GEO", "shield", "steel_thickness", 0.01);
        store.set_iarray("PMTINFO", "", "type", vec![]);
        store.set_darray("PMTINFO", "", "x", vec![]);
        let toml = store.to_toml().unwrap();
        let mut other = MemoryStore::new();
        other.load_str("round trip", &toml).unwrap();
        assert_eq!(store, other);
        assert_eq!(other.get_d("GEO", "shield", "steel_thickness").unwrap(), 0.01);
        assert!(other.get_iarray("PMTINFO", "", "type").unwrap().is_empty());
        assert!(other.get_darray("PMTINFO", "", "x").unwrap().is_empty());
    }
}

//! Code registries - turbine and parameter dictionaries
//!
//! Both registries are built once at startup and are read-only afterwards,
//! so they can be shared behind an `Arc` without locking. Lookups in either
//! direction are hash lookups.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{RegistryError, RegistryResult};
use crate::models::{DeviceCode, ParameterCode, TurbineId};

/// Header aliases for the parameter code column
const PARAMETER_CODE_HEADERS: &[&str] = &["var_pk", "code", "id", "varpk"];
/// Header aliases for the parameter name column
const PARAMETER_NAME_HEADERS: &[&str] = &["parameter", "param", "name", "description"];
/// Header aliases for the turbine display id column
const TURBINE_ID_HEADERS: &[&str] = &["turbine", "turbine_id", "id", "display"];
/// Header aliases for the turbine device code column
const TURBINE_CODE_HEADERS: &[&str] = &["device", "device_code", "code", "devicecode"];

/// Bidirectional map between parameter codes and display names
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    names: HashMap<ParameterCode, String>,
    codes: HashMap<String, ParameterCode>,
    /// Codes in source order
    order: Vec<ParameterCode>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (code, name) pairs; a repeated code keeps its first position
    /// and takes the last name
    pub fn from_pairs<C, N>(pairs: impl IntoIterator<Item = (C, N)>) -> Self
    where
        C: Into<ParameterCode>,
        N: Into<String>,
    {
        let mut registry = Self::new();
        for (code, name) in pairs {
            registry.insert(code.into(), name.into());
        }
        registry
    }

    /// Load from a two-column CSV file
    pub fn from_csv_path(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(file, &path.display().to_string())
    }

    /// Load from CSV text
    ///
    /// Columns are located by header name (`VAR_PK`/`code`/`id` and
    /// `Parameter`/`name`/`description`, case-insensitive); when either is
    /// missing the first two columns are used.
    pub fn from_csv_reader(reader: impl Read, source_name: &str) -> RegistryResult<Self> {
        let pairs = read_two_columns(
            reader,
            source_name,
            PARAMETER_CODE_HEADERS,
            PARAMETER_NAME_HEADERS,
        )?;
        Ok(Self::from_pairs(pairs))
    }

    fn insert(&mut self, code: ParameterCode, name: String) {
        if let Some(previous) = self.names.insert(code.clone(), name.clone()) {
            if self.codes.get(&previous) == Some(&code) {
                self.codes.remove(&previous);
            }
        } else {
            self.order.push(code.clone());
        }
        self.codes.insert(name, code);
    }

    pub fn name_of(&self, code: &ParameterCode) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn code_of(&self, name: &str) -> Option<&ParameterCode> {
        self.codes.get(name)
    }

    /// Display names in source order
    pub fn names(&self) -> Vec<String> {
        self.order
            .iter()
            .filter_map(|code| self.names.get(code).cloned())
            .collect()
    }

    /// (code, name) pairs in source order
    pub fn entries(&self) -> impl Iterator<Item = (&ParameterCode, &str)> {
        self.order
            .iter()
            .filter_map(|code| self.names.get(code).map(|name| (code, name.as_str())))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Bidirectional 1:1 map between turbine display ids and device codes
#[derive(Debug, Clone, Default)]
pub struct TurbineRegistry {
    devices: HashMap<TurbineId, DeviceCode>,
    turbines: HashMap<DeviceCode, TurbineId>,
}

impl TurbineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (display id, device code) pairs
    ///
    /// Rejects a display id or device code that appears twice with a
    /// different partner, since the mapping must stay 1:1.
    pub fn from_pairs<T, D>(pairs: impl IntoIterator<Item = (T, D)>) -> RegistryResult<Self>
    where
        T: Into<TurbineId>,
        D: Into<DeviceCode>,
    {
        let mut registry = Self::new();
        for (turbine, device) in pairs {
            let turbine = turbine.into();
            let device = device.into();
            if let Some(existing) = registry.devices.get(&turbine) {
                if existing != &device {
                    return Err(RegistryError::Duplicate(format!(
                        "turbine {} mapped to both {} and {}",
                        turbine, existing, device
                    )));
                }
            }
            if let Some(existing) = registry.turbines.get(&device) {
                if existing != &turbine {
                    return Err(RegistryError::Duplicate(format!(
                        "device {} mapped to both {} and {}",
                        device, existing, turbine
                    )));
                }
            }
            registry.devices.insert(turbine.clone(), device.clone());
            registry.turbines.insert(device, turbine);
        }
        Ok(registry)
    }

    /// Load from a two-column CSV file (display id, device code)
    pub fn from_csv_path(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(file, &path.display().to_string())
    }

    pub fn from_csv_reader(reader: impl Read, source_name: &str) -> RegistryResult<Self> {
        let pairs =
            read_two_columns(reader, source_name, TURBINE_ID_HEADERS, TURBINE_CODE_HEADERS)?;
        Self::from_pairs(pairs)
    }

    pub fn device_of(&self, turbine: &TurbineId) -> Option<&DeviceCode> {
        self.devices.get(turbine)
    }

    pub fn turbine_of(&self, device: &DeviceCode) -> Option<&TurbineId> {
        self.turbines.get(device)
    }

    /// All display ids, sorted
    pub fn ids(&self) -> Vec<TurbineId> {
        let mut ids: Vec<TurbineId> = self.devices.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Both registries, as handed to the engine
#[derive(Debug, Clone, Default)]
pub struct CodeRegistries {
    pub turbines: TurbineRegistry,
    pub parameters: ParameterRegistry,
}

impl CodeRegistries {
    pub fn new(turbines: TurbineRegistry, parameters: ParameterRegistry) -> Self {
        Self {
            turbines,
            parameters,
        }
    }
}

/// Read (key, value) pairs from a CSV with a header row
fn read_two_columns(
    reader: impl Read,
    source_name: &str,
    key_headers: &[&str],
    value_headers: &[&str],
) -> RegistryResult<Vec<(String, String)>> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let (key_idx, value_idx) = locate_columns(&headers, key_headers, value_headers).ok_or_else(
        || RegistryError::MissingColumns {
            source_name: source_name.to_string(),
            headers: headers.clone(),
        },
    )?;

    let mut pairs = Vec::new();
    for record in csv.records() {
        let record = record?;
        let key = record.get(key_idx).unwrap_or("").trim();
        let value = record.get(value_idx).unwrap_or("").trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        pairs.push((key.to_string(), value.to_string()));
    }

    tracing::debug!(source = %source_name, rows = pairs.len(), "Loaded registry rows");
    Ok(pairs)
}

/// Find column indices by header alias, falling back to the first two columns
fn locate_columns(
    headers: &[String],
    key_headers: &[&str],
    value_headers: &[&str],
) -> Option<(usize, usize)> {
    let normalized: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let find = |aliases: &[&str]| normalized.iter().position(|h| aliases.contains(&h.as_str()));

    match (find(key_headers), find(value_headers)) {
        (Some(key), Some(value)) if key != value => Some((key, value)),
        _ if headers.len() >= 2 => Some((0, 1)),
        _ => None,
    }
}

//! Named energy storage templates loaded from `machines.*`.

use std::collections::HashMap;
use std::path::Path;

use resonance_core::energy::EnergyRole;
use resonance_core::storage::EnergyStorage;

use crate::loader::{DataLoadError, check_duplicate, deserialize_list};
use crate::schema::{MachineData, RoleData};

/// Storage templates keyed by machine name.
#[derive(Debug, Clone, Default)]
pub struct MachineCatalog {
    templates: HashMap<String, EnergyStorage>,
}

impl MachineCatalog {
    pub fn get(&self, name: &str) -> Option<&EnergyStorage> {
        self.templates.get(name)
    }

    /// A fresh storage for a newly placed machine.
    pub fn instantiate(&self, name: &str) -> Option<EnergyStorage> {
        self.templates.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn resolve_role(role: RoleData) -> EnergyRole {
    match role {
        RoleData::Generator => EnergyRole::Generator,
        RoleData::Consumer => EnergyRole::Consumer,
        RoleData::Both => EnergyRole::Both,
    }
}

fn resolve_machine(data: &MachineData, path: &Path) -> Result<EnergyStorage, DataLoadError> {
    let bad = |detail| DataLoadError::BadMachine {
        file: path.to_path_buf(),
        name: data.name.clone(),
        detail,
    };
    if data.capacity == 0 {
        return Err(bad("capacity must be positive"));
    }
    if data.max_receive == 0 && data.max_extract == 0 {
        return Err(bad("neither accepts nor releases energy"));
    }
    if data.initial_energy > data.capacity {
        return Err(bad("initial energy exceeds capacity"));
    }

    let mut storage = EnergyStorage::new(data.capacity, data.max_receive, data.max_extract)
        .with_energy(data.initial_energy);
    if let Some(role) = data.role {
        storage = storage.with_role(resolve_role(role));
    }
    Ok(storage)
}

/// Read and resolve a machines file. Names must be unique.
pub fn load_machines(path: &Path) -> Result<MachineCatalog, DataLoadError> {
    let list: Vec<MachineData> = deserialize_list(path, "machines")?;
    let mut templates = HashMap::with_capacity(list.len());

    for data in &list {
        check_duplicate(&templates, &data.name, path)?;
        templates.insert(data.name.clone(), resolve_machine(data, path)?);
    }

    tracing::debug!(file = %path.display(), count = templates.len(), "machines loaded");
    Ok(MachineCatalog { templates })
}

#[cfg(test)]
mod tests {
    use super::*;
    use resonance_core::energy::EnergyEndpoint;
    use std::fs;
    use std::path::PathBuf;

    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "resonance_machines_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn machine(name: &str, capacity: u32, max_receive: u32, max_extract: u32) -> MachineData {
        MachineData {
            name: name.to_string(),
            capacity,
            max_receive,
            max_extract,
            role: None,
            initial_energy: 0,
        }
    }

    #[test]
    fn toml_catalog_resolves_roles() {
        let dir = make_test_dir("toml");
        let path = dir.join("machines.toml");
        fs::write(
            &path,
            r#"
[[machines]]
name = "resonant_burner"
capacity = 10000
max_extract = 1000
role = "generator"
initial_energy = 500

[[machines]]
name = "resonance_condenser"
capacity = 1000
max_receive = 100
role = "consumer"
"#,
        )
        .unwrap();

        let catalog = load_machines(&path).unwrap();
        assert_eq!(catalog.len(), 2);

        let burner = catalog.instantiate("resonant_burner").unwrap();
        assert_eq!(burner.role(), Some(EnergyRole::Generator));
        assert_eq!(burner.energy(), 500);
        assert!(burner.can_extract());
        assert!(!burner.can_receive());

        let condenser = catalog.get("resonance_condenser").unwrap();
        assert_eq!(condenser.role(), Some(EnergyRole::Consumer));
        assert!(catalog.get("missing").is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let dir = make_test_dir("dup");
        let path = dir.join("machines.json");
        fs::write(
            &path,
            r#"[{"name": "cell", "capacity": 10, "max_receive": 1},
                {"name": "cell", "capacity": 20, "max_receive": 1}]"#,
        )
        .unwrap();

        assert!(matches!(
            load_machines(&path),
            Err(DataLoadError::DuplicateName { name, .. }) if name == "cell"
        ));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn inert_machines_are_rejected() {
        let path = Path::new("machines.ron");
        for data in [
            machine("hollow", 0, 10, 10),
            machine("sealed", 100, 0, 0),
            MachineData {
                initial_energy: 200,
                ..machine("overfull", 100, 10, 10)
            },
        ] {
            assert!(matches!(
                resolve_machine(&data, path),
                Err(DataLoadError::BadMachine { .. })
            ));
        }
    }

    #[test]
    fn untagged_machine_stays_untagged() {
        let storage = resolve_machine(&machine("cell", 100, 10, 10), Path::new("m.ron")).unwrap();
        assert_eq!(storage.role(), None);
        assert!(storage.can_receive());
    }
}

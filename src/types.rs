use crate::error::{PlanillaError, PlanillaResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// Number of beneficiary rows stamped onto one template block.
pub const PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(size) => size,
    None => unreachable!(),
};

/// Column names expected in the uploaded rosters.
pub mod columns {
    pub const ESTABLISHMENT: &str = "Comunidad/ Establecimiento";
    pub const DEPARTMENT: &str = "Departamento";
    pub const MUNICIPALITY: &str = "Municipio";
    pub const TECHNICIAN_NAME: &str = "Nombre del técnico";
    pub const TECHNICIAN_ID: &str = "CUI del técnico";
    pub const SUPPLY: &str = "Insumo";
    pub const SCHOOL_CODE: &str = "CODIGO ESCOLAR";
    pub const TRAINING_REGISTRY: &str =
        "Listado de Registro de capacitacion y asistencia Tecnica";

    pub const REFERENCE: &str = "Referencia";
    pub const FIRST_NAME: &str = "PRIMER NOMBRE";
    pub const SECOND_NAME: &str = "SEGUNDO NOMBRE";
    pub const THIRD_NAME: &str = "TERCER NOMBRE";
    pub const FIRST_SURNAME: &str = "PRIMER APELLIDO";
    pub const SECOND_SURNAME: &str = "SEGUNDO APELLIDO";
    pub const MARRIED_SURNAME: &str = "APELLIDO CASADA";
    pub const IDENTIFIER: &str = "CUI";
}

/// Normalize a column header: surrounding whitespace and non-breaking spaces go.
pub fn normalize_header(header: &str) -> String {
    header.trim().replace('\u{a0}', "")
}

/// Key used to compare column names case-insensitively.
fn column_key(name: &str) -> String {
    normalize_header(name).to_uppercase()
}

//==============================================================================
// Raw tabular data
//==============================================================================

/// A worksheet read as text: one header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table, normalizing every header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| normalize_header(h)).collect(),
            rows,
        }
    }

    /// Position of a column, matched case-insensitively after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let key = column_key(name);
        self.headers.iter().position(|h| column_key(h) == key)
    }

    /// Cell text, empty when the row is shorter than the header.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//==============================================================================
// Community roster
//==============================================================================

/// One row of the community / establishment table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityRecord {
    pub establishment_name: String,
    pub department: String,
    pub municipality: String,
    pub technician_name: String,
    pub technician_id: String,
    pub supply_label: String,
    pub school_code: Option<String>,
    pub training_registry_label: Option<String>,
}

impl CommunityRecord {
    pub fn new(establishment_name: impl Into<String>) -> Self {
        Self {
            establishment_name: establishment_name.into(),
            ..Default::default()
        }
    }
}

/// The loaded community table, keeping track of which columns were present.
#[derive(Debug, Clone, Default)]
pub struct CommunityTable {
    pub columns: Vec<String>,
    pub records: Vec<CommunityRecord>,
}

impl CommunityTable {
    /// Parse community rows. The establishment column is mandatory.
    pub fn from_raw(raw: &RawTable) -> PlanillaResult<Self> {
        let establishment = raw.column_index(columns::ESTABLISHMENT).ok_or_else(|| {
            PlanillaError::MissingColumns(vec![columns::ESTABLISHMENT.to_string()])
        })?;

        let lookup = |name: &str| raw.column_index(name);
        let department = lookup(columns::DEPARTMENT);
        let municipality = lookup(columns::MUNICIPALITY);
        let technician_name = lookup(columns::TECHNICIAN_NAME);
        let technician_id = lookup(columns::TECHNICIAN_ID);
        let supply = lookup(columns::SUPPLY);
        let school_code = lookup(columns::SCHOOL_CODE);
        let training = lookup(columns::TRAINING_REGISTRY);

        let text = |row: usize, col: Option<usize>| {
            col.map(|c| raw.cell(row, c).trim().to_string())
                .unwrap_or_default()
        };

        let records = (0..raw.len())
            .map(|row| CommunityRecord {
                establishment_name: raw.cell(row, establishment).trim().to_string(),
                department: text(row, department),
                municipality: text(row, municipality),
                technician_name: text(row, technician_name),
                technician_id: text(row, technician_id),
                supply_label: text(row, supply),
                school_code: school_code.map(|c| raw.cell(row, c).trim().to_string()),
                training_registry_label: training.map(|c| raw.cell(row, c).trim().to_string()),
            })
            .collect();

        Ok(Self {
            columns: raw.headers.clone(),
            records,
        })
    }

    pub fn from_records(records: Vec<CommunityRecord>) -> Self {
        let columns = [
            columns::ESTABLISHMENT,
            columns::DEPARTMENT,
            columns::MUNICIPALITY,
            columns::TECHNICIAN_NAME,
            columns::TECHNICIAN_ID,
            columns::SUPPLY,
            columns::SCHOOL_CODE,
            columns::TRAINING_REGISTRY,
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        Self { columns, records }
    }

    pub fn has_column(&self, name: &str) -> bool {
        let key = column_key(name);
        self.columns.iter().any(|c| column_key(c) == key)
    }

    /// Fail with every absent column named.
    pub fn require(&self, names: &[&str]) -> PlanillaResult<()> {
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PlanillaError::MissingColumns(missing))
        }
    }
}

//==============================================================================
// Beneficiary roster
//==============================================================================

/// One beneficiary row; cells are keyed by upper-cased column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeneficiaryRecord {
    pub reference_key: String,
    pub fields: HashMap<String, String>,
}

impl BeneficiaryRecord {
    pub fn new(reference_key: impl Into<String>) -> Self {
        Self {
            reference_key: reference_key.into(),
            fields: HashMap::new(),
        }
    }

    /// Builder-style field setter, mostly for fixtures.
    pub fn with_field(mut self, column: &str, value: impl Into<String>) -> Self {
        self.fields.insert(column_key(column), value.into());
        self
    }

    /// Raw cell text for a column, `None` when the column was absent.
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields.get(&column_key(column)).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BeneficiaryTable {
    pub columns: Vec<String>,
    pub records: Vec<BeneficiaryRecord>,
}

impl BeneficiaryTable {
    /// Parse beneficiary rows. The reference column is mandatory.
    pub fn from_raw(raw: &RawTable) -> PlanillaResult<Self> {
        let reference = raw.column_index(columns::REFERENCE).ok_or_else(|| {
            PlanillaError::MissingColumns(vec![columns::REFERENCE.to_string()])
        })?;

        let keys: Vec<String> = raw.headers.iter().map(|h| column_key(h)).collect();
        let records = raw
            .rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let fields = keys
                    .iter()
                    .zip(cells.iter())
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                BeneficiaryRecord {
                    reference_key: raw.cell(row, reference).to_string(),
                    fields,
                }
            })
            .collect();

        Ok(Self {
            columns: raw.headers.clone(),
            records,
        })
    }

    pub fn from_records(columns: Vec<String>, records: Vec<BeneficiaryRecord>) -> Self {
        Self { columns, records }
    }

    pub fn has_column(&self, name: &str) -> bool {
        let key = column_key(name);
        self.columns.iter().any(|c| column_key(c) == key)
    }
}

/// Ordered name fragment columns plus the identifier column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameColumns {
    pub fragments: [String; 6],
    pub identifier: String,
}

impl Default for NameColumns {
    fn default() -> Self {
        Self {
            fragments: [
                columns::FIRST_NAME.to_string(),
                columns::SECOND_NAME.to_string(),
                columns::THIRD_NAME.to_string(),
                columns::FIRST_SURNAME.to_string(),
                columns::SECOND_SURNAME.to_string(),
                columns::MARRIED_SURNAME.to_string(),
            ],
            identifier: columns::IDENTIFIER.to_string(),
        }
    }
}

impl NameColumns {
    /// Every column the batch resolver needs, in order.
    pub fn required(&self) -> Vec<&str> {
        self.fragments
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.identifier.as_str()))
            .collect()
    }
}

//==============================================================================
// Resolved beneficiaries and pages
//==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBeneficiary {
    pub full_name: String,
    pub identifier: String,
}

/// One row of a page: a beneficiary or a blank placeholder.
///
/// Both serialize as a `full_name`/`identifier` pair; a placeholder is the
/// empty pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Filled(ResolvedBeneficiary),
    Empty,
}

impl Slot {
    pub fn full_name(&self) -> &str {
        match self {
            Slot::Filled(b) => &b.full_name,
            Slot::Empty => "",
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Slot::Filled(b) => &b.identifier,
            Slot::Empty => "",
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

impl Serialize for Slot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut pair = serializer.serialize_struct("Slot", 2)?;
        pair.serialize_field("full_name", self.full_name())?;
        pair.serialize_field("identifier", self.identifier())?;
        pair.end()
    }
}

/// A fixed-size block of slots stamped onto one template instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub index: usize,
    pub slots: Vec<Slot>,
}

impl Page {
    /// Beneficiaries on this page, placeholders skipped.
    pub fn beneficiaries(&self) -> impl Iterator<Item = &ResolvedBeneficiary> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Filled(b) => Some(b),
            Slot::Empty => None,
        })
    }

    pub fn placeholder_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_placeholder()).count()
    }
}

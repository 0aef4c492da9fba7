//! Column layouts: which spreadsheet column feeds which budget field.
//!
//! Layout variants differ only in column positions. The field set and all
//! downstream processing are shared, so a layout is plain configuration: a
//! map from `Field` to a zero-based column index.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, EMPTY_CELL};
use super::cost_code::COST_CODES;
use super::error::LayoutError;

/// Whether a field holds free text or a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Decimal number.
    Number,
}

/// A budget line item field that can be read from a sheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Hierarchical line item identifier.
    LineItemNumber,
    /// Line item description.
    LineItemName,
    /// Work category tag.
    CostCode,
    /// Unit of the measured quantity.
    UnconvertedUnitOfMeasure,
    /// Measured quantity.
    UnconvertedQty,
    /// Unit of the billed quantity.
    ConvertedUnitOfMeasure,
    /// Billed quantity.
    ConvertedQty,
    /// Multiplier from measured to billed units.
    ConversionFactor,
    /// Cost per measured unit.
    UnitCost,
    /// Quantity times unit cost.
    UnitTotal,
    /// Labor hours per billed unit.
    ProductionRate,
    /// Labor hours.
    Hours,
    /// Hours times labor rate.
    LaborCost,
    /// Equipment cost.
    EquipmentCost,
    /// Trucking cost.
    TruckingCost,
    /// Dump fees.
    DumpFeesCost,
    /// Material cost.
    MaterialCost,
    /// Subcontractor cost.
    SubcontractorCost,
    /// Sum of all cost components.
    BudgetTotal,
    /// Amount billed to the owner.
    Billing,
    /// Actual measured quantity.
    ActualQty,
    /// Actual billed quantity.
    ActualConvQty,
    /// Free-form notes.
    Notes,
}

impl Field {
    /// Every field, in generic template order.
    pub const ALL: [Self; 23] = [
        Self::LineItemNumber,
        Self::LineItemName,
        Self::CostCode,
        Self::UnconvertedUnitOfMeasure,
        Self::UnconvertedQty,
        Self::ConvertedUnitOfMeasure,
        Self::ConvertedQty,
        Self::ConversionFactor,
        Self::UnitCost,
        Self::UnitTotal,
        Self::ProductionRate,
        Self::Hours,
        Self::LaborCost,
        Self::EquipmentCost,
        Self::TruckingCost,
        Self::DumpFeesCost,
        Self::MaterialCost,
        Self::SubcontractorCost,
        Self::BudgetTotal,
        Self::Billing,
        Self::ActualQty,
        Self::ActualConvQty,
        Self::Notes,
    ];

    /// Fields a layout cannot omit.
    pub const LAYOUT_REQUIRED: [Self; 5] = [
        Self::LineItemNumber,
        Self::LineItemName,
        Self::CostCode,
        Self::UnconvertedQty,
        Self::ConvertedQty,
    ];

    /// Column header shown in templates and validation errors.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::LineItemNumber => "Line Item Number",
            Self::LineItemName => "Line Item Name",
            Self::CostCode => "Cost Code",
            Self::UnconvertedUnitOfMeasure => "Unit of Measure",
            Self::UnconvertedQty => "Quantity",
            Self::ConvertedUnitOfMeasure => "Converted Unit of Measure",
            Self::ConvertedQty => "Converted Quantity",
            Self::ConversionFactor => "Conversion Factor",
            Self::UnitCost => "Unit Cost",
            Self::UnitTotal => "Unit Total",
            Self::ProductionRate => "Production Rate",
            Self::Hours => "Hours",
            Self::LaborCost => "Labor Cost",
            Self::EquipmentCost => "Equipment",
            Self::TruckingCost => "Trucking",
            Self::DumpFeesCost => "Dump Fees",
            Self::MaterialCost => "Material",
            Self::SubcontractorCost => "Subcontractor",
            Self::BudgetTotal => "Budget Total",
            Self::Billing => "Billing",
            Self::ActualQty => "Actual Quantity",
            Self::ActualConvQty => "Actual Converted Quantity",
            Self::Notes => "Notes",
        }
    }

    /// Record key of the field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::LineItemNumber => "lineItemNumber",
            Self::LineItemName => "lineItemName",
            Self::CostCode => "costCode",
            Self::UnconvertedUnitOfMeasure => "unconvertedUnitOfMeasure",
            Self::UnconvertedQty => "unconvertedQty",
            Self::ConvertedUnitOfMeasure => "convertedUnitOfMeasure",
            Self::ConvertedQty => "convertedQty",
            Self::ConversionFactor => "conversionFactor",
            Self::UnitCost => "unitCost",
            Self::UnitTotal => "unitTotal",
            Self::ProductionRate => "productionRate",
            Self::Hours => "hours",
            Self::LaborCost => "laborCost",
            Self::EquipmentCost => "equipmentCost",
            Self::TruckingCost => "truckingCost",
            Self::DumpFeesCost => "dumpFeesCost",
            Self::MaterialCost => "materialCost",
            Self::SubcontractorCost => "subcontractorCost",
            Self::BudgetTotal => "budgetTotal",
            Self::Billing => "billing",
            Self::ActualQty => "actualQty",
            Self::ActualConvQty => "actualConvQty",
            Self::Notes => "notes",
        }
    }

    /// Looks a field up by record key, ignoring case, `_` and `-`.
    ///
    /// `"costCode"`, `"cost_code"` and `"COST-CODE"` all resolve to `CostCode`.
    #[must_use]
    pub fn from_key(raw: &str) -> Option<Self> {
        let wanted: String = raw
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect();
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(wanted.trim()))
    }

    /// Text or number.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::LineItemNumber
            | Self::LineItemName
            | Self::CostCode
            | Self::UnconvertedUnitOfMeasure
            | Self::ConvertedUnitOfMeasure
            | Self::Notes => FieldKind::Text,
            _ => FieldKind::Number,
        }
    }

    /// Whether the validator rejects rows that leave this field blank.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::LineItemNumber | Self::CostCode)
    }

    /// Whether the formula engine computes this field.
    #[must_use]
    pub const fn is_derived(self) -> bool {
        matches!(
            self,
            Self::UnitTotal
                | Self::ConvertedQty
                | Self::Hours
                | Self::LaborCost
                | Self::BudgetTotal
                | Self::Billing
        )
    }

    /// Help text for the template sheet.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::LineItemNumber => "Unique line item id; use 3.2 for a child of 3",
            Self::LineItemName => "Description of the work",
            Self::CostCode => "One of the allowed cost codes",
            Self::UnconvertedUnitOfMeasure => "Unit the quantity is measured in (e.g. CY)",
            Self::UnconvertedQty => "Measured quantity; leave blank on category rows",
            Self::ConvertedUnitOfMeasure => "Unit the quantity is billed in (e.g. TON)",
            Self::ConvertedQty => "Billed quantity; calculated from the conversion factor",
            Self::ConversionFactor => "Billed units per measured unit; defaults to 1",
            Self::UnitCost => "Cost per measured unit",
            Self::UnitTotal => "Calculated: quantity x unit cost",
            Self::ProductionRate => "Labor hours per billed unit",
            Self::Hours => "Calculated: converted quantity x production rate",
            Self::LaborCost => "Calculated: hours x labor rate",
            Self::EquipmentCost => "Equipment cost",
            Self::TruckingCost => "Trucking cost",
            Self::DumpFeesCost => "Dump fees",
            Self::MaterialCost => "Material cost",
            Self::SubcontractorCost => "Subcontractor cost",
            Self::BudgetTotal => "Calculated: labor + equipment + trucking + dump fees + material + subcontractor",
            Self::Billing => "Calculated: equals unit total",
            Self::ActualQty => "Actual measured quantity to date",
            Self::ActualConvQty => "Actual billed quantity to date",
            Self::Notes => "Optional notes",
        }
    }
}

/// Named mapping from fields to zero-based column indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    name: String,
    columns: BTreeMap<Field, usize>,
}

impl ColumnLayout {
    /// Builds a layout, rejecting incomplete or ambiguous mappings.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError` if a required field is unmapped, a field is
    /// mapped twice, or two fields share a column.
    pub fn new(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (Field, usize)>,
    ) -> Result<Self, LayoutError> {
        let name = name.into();
        let mut columns = BTreeMap::new();
        let mut by_index: HashMap<usize, Field> = HashMap::new();

        for (field, index) in entries {
            if columns.insert(field, index).is_some() {
                return Err(LayoutError::DuplicateField { layout: name, field });
            }
            if let Some(first) = by_index.insert(index, field) {
                return Err(LayoutError::DuplicateIndex {
                    layout: name,
                    index,
                    first,
                    second: field,
                });
            }
        }

        if let Some(field) = Field::LAYOUT_REQUIRED
            .into_iter()
            .find(|field| !columns.contains_key(field))
        {
            return Err(LayoutError::MissingField { layout: name, field });
        }

        Ok(Self { name, columns })
    }

    fn built_in(kind: LayoutKind, order: &[Field]) -> Self {
        Self::new(kind.name(), order.iter().copied().zip(0..))
            .unwrap_or_else(|err| panic!("built-in layout is misconfigured: {err}"))
    }

    /// The 20-column generic import template.
    #[must_use]
    pub fn generic() -> Self {
        Self::built_in(
            LayoutKind::Generic,
            &[
                Field::LineItemNumber,
                Field::LineItemName,
                Field::UnconvertedUnitOfMeasure,
                Field::UnconvertedQty,
                Field::ConversionFactor,
                Field::UnitCost,
                Field::UnitTotal,
                Field::CostCode,
                Field::ConvertedUnitOfMeasure,
                Field::ConvertedQty,
                Field::ProductionRate,
                Field::Hours,
                Field::LaborCost,
                Field::EquipmentCost,
                Field::TruckingCost,
                Field::DumpFeesCost,
                Field::MaterialCost,
                Field::SubcontractorCost,
                Field::BudgetTotal,
                Field::Notes,
            ],
        )
    }

    /// Project budget export with the cost code next to the line item number.
    #[must_use]
    pub fn project_v1() -> Self {
        Self::built_in(LayoutKind::ProjectV1, &project_order(true))
    }

    /// Project budget export with the line item name before the cost code.
    #[must_use]
    pub fn project_v2() -> Self {
        Self::built_in(LayoutKind::ProjectV2, &project_order(false))
    }

    /// Layout name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column index of a field, if the layout maps it.
    #[must_use]
    pub fn index_of(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Number of columns a complete header row has.
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.values().max().map_or(0, |max| max + 1)
    }

    /// The cell feeding `field`; blank when unmapped or past the row end.
    #[must_use]
    pub fn cell<'r>(&self, row: &'r [Cell], field: Field) -> &'r Cell {
        self.index_of(field)
            .and_then(|index| row.get(index))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Mapped fields in column order.
    #[must_use]
    pub fn fields(&self) -> Vec<(Field, usize)> {
        let mut fields: Vec<_> = self.columns.iter().map(|(f, i)| (*f, *i)).collect();
        fields.sort_by_key(|(_, index)| *index);
        fields
    }

    /// Mapped numeric fields in column order.
    #[must_use]
    pub fn numeric_fields(&self) -> Vec<Field> {
        self.fields()
            .into_iter()
            .map(|(field, _)| field)
            .filter(|field| field.kind() == FieldKind::Number)
            .collect()
    }

    /// Column descriptors for template generation.
    #[must_use]
    pub fn template_columns(&self) -> Vec<TemplateColumn> {
        self.fields()
            .into_iter()
            .map(|(field, column)| TemplateColumn {
                column,
                header: field.header(),
                key: field.key(),
                required: field.is_required(),
                calculated: field.is_derived(),
                description: field.description(),
            })
            .collect()
    }

    /// Everything a template generator needs for this layout.
    #[must_use]
    pub fn template(&self) -> SheetTemplate {
        SheetTemplate {
            layout: self.name.clone(),
            columns: self.template_columns(),
            cost_codes: COST_CODES.to_vec(),
        }
    }
}

fn project_order(cost_code_first: bool) -> Vec<Field> {
    let mut order = vec![Field::LineItemNumber];
    if cost_code_first {
        order.extend([Field::CostCode, Field::LineItemName]);
    } else {
        order.extend([Field::LineItemName, Field::CostCode]);
    }
    order.extend([
        Field::UnconvertedUnitOfMeasure,
        Field::UnconvertedQty,
        Field::ConvertedUnitOfMeasure,
        Field::ConvertedQty,
        Field::ConversionFactor,
        Field::UnitCost,
        Field::UnitTotal,
        Field::ProductionRate,
        Field::Hours,
        Field::LaborCost,
        Field::EquipmentCost,
        Field::TruckingCost,
        Field::DumpFeesCost,
        Field::MaterialCost,
        Field::SubcontractorCost,
        Field::BudgetTotal,
        Field::Billing,
        Field::ActualQty,
        Field::ActualConvQty,
        Field::Notes,
    ]);
    order
}

/// The built-in layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Generic import template.
    Generic,
    /// Project export, cost code in column B.
    ProjectV1,
    /// Project export, cost code in column C.
    ProjectV2,
}

impl LayoutKind {
    /// All built-in layouts.
    pub const ALL: [Self; 3] = [Self::Generic, Self::ProjectV1, Self::ProjectV2];

    /// Configuration name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::ProjectV1 => "project_v1",
            Self::ProjectV2 => "project_v2",
        }
    }

    /// Builds the layout.
    #[must_use]
    pub fn layout(self) -> ColumnLayout {
        match self {
            Self::Generic => ColumnLayout::generic(),
            Self::ProjectV1 => ColumnLayout::project_v1(),
            Self::ProjectV2 => ColumnLayout::project_v2(),
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| format!("Unknown layout: {s}"))
    }
}

/// One column of the import template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateColumn {
    /// Zero-based column index.
    pub column: usize,
    /// Header text.
    pub header: &'static str,
    /// Record key.
    pub key: &'static str,
    /// Whether the validator requires a value.
    pub required: bool,
    /// Whether the formula engine fills this column on import.
    pub calculated: bool,
    /// Help text.
    pub description: &'static str,
}

/// Template definition handed to the template generator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTemplate {
    /// Layout name.
    pub layout: String,
    /// Columns in sheet order.
    pub columns: Vec<TemplateColumn>,
    /// Values for the cost code dropdown.
    pub cost_codes: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_layouts_construct() {
        for kind in LayoutKind::ALL {
            let layout = kind.layout();
            assert_eq!(layout.name(), kind.name());
        }
    }

    #[test]
    fn test_generic_layout_positions() {
        let layout = ColumnLayout::generic();
        assert_eq!(layout.width(), 20);
        assert_eq!(layout.index_of(Field::LineItemNumber), Some(0));
        assert_eq!(layout.index_of(Field::UnconvertedQty), Some(3));
        assert_eq!(layout.index_of(Field::UnitCost), Some(5));
        assert_eq!(layout.index_of(Field::CostCode), Some(7));
        assert_eq!(layout.index_of(Field::ProductionRate), Some(10));
        assert_eq!(layout.index_of(Field::Billing), None);
    }

    #[test]
    fn test_project_layouts_differ_only_in_positions() {
        let v1 = ColumnLayout::project_v1();
        let v2 = ColumnLayout::project_v2();
        assert_eq!(v1.width(), 23);
        assert_eq!(v2.width(), 23);
        assert_eq!(v1.index_of(Field::CostCode), Some(1));
        assert_eq!(v2.index_of(Field::CostCode), Some(2));

        let fields = |layout: &ColumnLayout| {
            let mut f: Vec<_> = layout.fields().into_iter().map(|(f, _)| f).collect();
            f.sort();
            f
        };
        assert_eq!(fields(&v1), fields(&v2));
    }

    #[test]
    fn test_missing_required_field() {
        let err = ColumnLayout::new("custom", [(Field::LineItemNumber, 0)]).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::MissingField {
                field: Field::LineItemName,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let err = ColumnLayout::new("custom", [(Field::UnitCost, 4), (Field::UnitTotal, 4)])
            .unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateIndex { index: 4, .. }));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err =
            ColumnLayout::new("custom", [(Field::UnitCost, 4), (Field::UnitCost, 5)]).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::DuplicateField {
                field: Field::UnitCost,
                ..
            }
        ));
    }

    #[test]
    fn test_cell_past_row_end_is_blank() {
        let layout = ColumnLayout::generic();
        let row = vec![Cell::from("1")];
        assert_eq!(layout.cell(&row, Field::LineItemNumber), &Cell::from("1"));
        assert!(layout.cell(&row, Field::Notes).is_blank());
        assert!(layout.cell(&row, Field::Billing).is_blank());
    }

    #[test]
    fn test_numeric_fields_exclude_text() {
        let numeric = ColumnLayout::generic().numeric_fields();
        assert!(numeric.contains(&Field::UnitCost));
        assert!(!numeric.contains(&Field::CostCode));
        assert!(!numeric.contains(&Field::Notes));
        assert_eq!(numeric.first(), Some(&Field::UnconvertedQty));
    }

    #[test]
    fn test_template_export() {
        let template = ColumnLayout::generic().template();
        assert_eq!(template.layout, "generic");
        assert_eq!(template.columns.len(), 20);
        assert_eq!(template.columns[0].header, "Line Item Number");
        assert!(template.columns[0].required);
        assert_eq!(template.columns[7].key, "costCode");
        assert!(template.columns[7].required);
        assert!(!template.columns[1].required);
        assert!(template.cost_codes.contains(&"Concrete"));

        let calculated: Vec<_> = template
            .columns
            .iter()
            .filter(|column| column.calculated)
            .map(|column| column.key)
            .collect();
        assert_eq!(
            calculated,
            ["unitTotal", "convertedQty", "hours", "laborCost", "budgetTotal"]
        );
    }

    #[test]
    fn test_field_from_key() {
        assert_eq!(Field::from_key("costCode"), Some(Field::CostCode));
        assert_eq!(Field::from_key("cost_code"), Some(Field::CostCode));
        assert_eq!(Field::from_key("COST-CODE"), Some(Field::CostCode));
        assert_eq!(Field::from_key("actual_conv_qty"), Some(Field::ActualConvQty));
        assert_eq!(Field::from_key("costcodes"), None);
        assert!(Field::ALL.iter().all(|f| Field::from_key(f.key()) == Some(*f)));
    }

    #[test]
    fn test_layout_kind_from_str() {
        assert_eq!("generic".parse::<LayoutKind>().unwrap(), LayoutKind::Generic);
        assert_eq!("Project-V1".parse::<LayoutKind>().unwrap(), LayoutKind::ProjectV1);
        assert!("legacy".parse::<LayoutKind>().is_err());
        assert_eq!(LayoutKind::ProjectV2.to_string(), "project_v2");
    }
}

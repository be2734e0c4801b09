//! Filter vocabulary, filter sets and the field-to-column mapping.

use floorwise_core::config::RetrievalConfig;
use floorwise_core::{AppError, AppResult};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

macro_rules! filter_fields {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// A product attribute the filter extractor may constrain.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FilterField {
            $($variant),+
        }

        impl FilterField {
            /// Every field in the vocabulary, in product-sheet order.
            pub const ALL: &'static [FilterField] = &[$(FilterField::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(FilterField::$variant => $name),+
                }
            }

            pub fn parse(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(FilterField::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

filter_fields! {
    CollectionName => "collection_name",
    Sku => "sku",
    StyleNumber => "style_number",
    StyleName => "style_name",
    DyeMethod => "dye_method",
    DyeMethodDescription => "dye_method_description",
    SurfaceFinishDescription => "surface_finish_description",
    PatternType => "pattern_type",
    PatternScale => "pattern_scale",
    BudgetCategory => "budget_category",
    StainResistance => "stain_resistance",
    ProductGroup => "product_group",
    ProductSubgroup => "product_subgroup",
    FiberContentDescription => "fiber_content_description",
    ProductType => "producttype",
    PrimaryMarket => "primarymarket",
    Segment => "segment",
    StyleWarranty1 => "stylewarranty1",
    ConstructionCategory => "construction_category",
    Overview => "overview",
    TotalRecycledContent => "totalrecycledcontent",
    EmbodiedCarbon => "embodied_carbon",
    BeyondCarbonNeutral => "beyond_carbon_neutral",
    InstallationMethod => "installationmethod",
    EnvironmentalProductDeclaration => "environmentalproductdeclaration",
    CarbonHandprint => "carbon_handprint",
    ColorCode => "color_code",
    MarketingColorName => "marketing_color_name",
    ColorName => "color_name",
    Size => "size",
    SizeDescription => "size_description",
    BackingCode => "backing_code",
    BackingDescription => "backing_description",
    IntroductionDate => "introduction_date",
    Quickship => "quickship",
    FinishedPileThickness => "finished_pile_thickness",
    OnlineSampleAvailable => "online_sample_available",
    Tarr => "tarr",
    TvocRange => "tvoc_range",
    ProductFamily => "product_family",
    ProductClassification => "product_classification",
    WidthFt => "width_ft",
    PrimaryBacking => "primary_backing",
    SqftPerCarton => "sqft_per_carton",
    PoundsPerCarton => "pounds_per_carton",
    ColorFamily => "color_family",
    MaxRollsize => "max_rollsize",
    PiecesPerCarton => "pieces_per_carton",
    Construction => "construction",
    TotalWeight => "total_weight",
    InstallationPattern => "installation_pattern",
}

impl FilterField {
    /// Column in the `products` table holding this attribute.
    pub fn column(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FilterField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Matched as a case-insensitive substring
    Scalar(String),
    /// Matched by membership
    List(Vec<String>),
}

impl FilterValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        FilterValue::Scalar(value.into())
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterValue::Scalar(value) => serializer.serialize_str(value),
            FilterValue::List(values) => values.serialize(serializer),
        }
    }
}

/// Field constraints derived from free text. Keys are always drawn from the
/// vocabulary; iteration order is the vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: BTreeMap<FilterField, FilterValue>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FilterField, value: FilterValue) -> Option<FilterValue> {
        self.entries.insert(field, value)
    }

    pub fn get(&self, field: FilterField) -> Option<&FilterValue> {
        self.entries.get(&field)
    }

    pub fn contains(&self, field: FilterField) -> bool {
        self.entries.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &FilterValue)> {
        self.entries.iter().map(|(field, value)| (*field, value))
    }

    pub fn fields(&self) -> impl Iterator<Item = FilterField> + '_ {
        self.entries.keys().copied()
    }

    /// Replace the classification constraint with the partition's labels.
    pub fn with_classification(mut self, classifications: Vec<String>) -> Self {
        self.entries.insert(
            FilterField::ProductClassification,
            FilterValue::List(classifications),
        );
        self
    }
}

impl Serialize for FilterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, value) in &self.entries {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

/// How a column is constrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateKind {
    /// Column value is one of the listed values
    Membership(Vec<String>),
    /// Column value contains the text, ignoring case
    Contains(String),
}

/// A single column constraint. Predicates are combined with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub column: &'static str,
    pub kind: PredicateKind,
}

/// Startup-validated mapping from filter names to product columns.
///
/// Only mapped fields reach the relational store. The classification field is
/// always mapped because every structured query is scoped by partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    fields: BTreeSet<FilterField>,
}

impl FieldMapping {
    /// Map the whole vocabulary.
    pub fn full() -> Self {
        Self {
            fields: FilterField::ALL.iter().copied().collect(),
        }
    }

    /// Map a subset of the vocabulary by name.
    ///
    /// # Errors
    /// Returns `AppError::Config` for any name outside the vocabulary.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> AppResult<Self> {
        let mut fields = BTreeSet::new();
        let mut unknown = Vec::new();

        for name in names {
            match FilterField::parse(name.as_ref().trim()) {
                Some(field) => {
                    fields.insert(field);
                }
                None => unknown.push(name.as_ref().to_string()),
            }
        }

        if !unknown.is_empty() {
            return Err(AppError::Config(format!(
                "Unknown filter fields in retrieval.filterFields: {}",
                unknown.join(", ")
            )));
        }

        fields.insert(FilterField::ProductClassification);
        Ok(Self { fields })
    }

    /// Build the mapping from `retrieval.filterFields`, or the full
    /// vocabulary when the setting is absent.
    pub fn from_config(config: &RetrievalConfig) -> AppResult<Self> {
        match &config.filter_fields {
            Some(names) => Self::from_names(names),
            None => Ok(Self::full()),
        }
    }

    pub fn contains(&self, field: FilterField) -> bool {
        self.fields.contains(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = FilterField> + '_ {
        self.fields.iter().copied()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.column())
    }

    /// Fields offered to the extractor. Classification is excluded: it only
    /// ever comes from the partition.
    pub fn extractable_names(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|field| **field != FilterField::ProductClassification)
            .map(|field| field.as_str())
            .collect()
    }

    /// Translate a filter set into column predicates. Unmapped fields are
    /// dropped; list values become membership tests, scalars become
    /// case-insensitive substring matches.
    pub fn predicates(&self, filters: &FilterSet) -> Vec<Predicate> {
        filters
            .iter()
            .filter(|(field, _)| self.contains(*field))
            .map(|(field, value)| Predicate {
                column: field.column(),
                kind: match value {
                    FilterValue::List(values) => PredicateKind::Membership(values.clone()),
                    FilterValue::Scalar(value) => PredicateKind::Contains(value.clone()),
                },
            })
            .collect()
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_round_trips() {
        assert_eq!(FilterField::ALL.len(), 51);
        for field in FilterField::ALL {
            assert_eq!(FilterField::parse(field.as_str()), Some(*field));
        }
        assert!(FilterField::parse("backing_codebacking_description").is_none());
        assert!(FilterField::parse("Collection_Name").is_none());
    }

    #[test]
    fn test_mapping_rejects_unknown_names() {
        let err = FieldMapping::from_names(&["collection_name", "price"]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn test_mapping_always_includes_classification() {
        let mapping = FieldMapping::from_names(&["collection_name"]).unwrap();
        assert!(mapping.contains(FilterField::CollectionName));
        assert!(mapping.contains(FilterField::ProductClassification));
        assert!(!mapping.contains(FilterField::StyleName));
        assert_eq!(mapping.extractable_names(), vec!["collection_name"]);
    }

    #[test]
    fn test_mapping_from_config() {
        let mut config = RetrievalConfig::default();
        assert_eq!(FieldMapping::from_config(&config).unwrap(), FieldMapping::full());

        config.filter_fields = Some(vec!["style_name".to_string(), "bogus".to_string()]);
        assert!(FieldMapping::from_config(&config).is_err());
    }

    #[test]
    fn test_predicates_follow_value_shape() {
        let mut filters = FilterSet::new();
        filters.insert(FilterField::CollectionName, FilterValue::scalar("Element"));
        let filters = filters.with_classification(vec!["SoftSurface".to_string()]);

        let predicates = FieldMapping::full().predicates(&filters);
        assert_eq!(
            predicates,
            vec![
                Predicate {
                    column: "collection_name",
                    kind: PredicateKind::Contains("Element".to_string()),
                },
                Predicate {
                    column: "product_classification",
                    kind: PredicateKind::Membership(vec!["SoftSurface".to_string()]),
                },
            ]
        );
    }

    #[test]
    fn test_predicates_skip_unmapped_fields() {
        let mapping = FieldMapping::from_names(&["collection_name"]).unwrap();
        let mut filters = FilterSet::new();
        filters.insert(FilterField::StyleName, FilterValue::scalar("Aria"));

        assert!(mapping.predicates(&filters).is_empty());
    }

    #[test]
    fn test_filter_set_serializes_as_flat_object() {
        let mut filters = FilterSet::new();
        filters.insert(FilterField::StyleName, FilterValue::scalar("Aria"));
        let filters = filters.with_classification(vec!["HardSurface".to_string()]);

        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "style_name": "Aria",
                "product_classification": ["HardSurface"],
            })
        );
    }
}

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Fields the carrier accepts in a branch search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    BranchNo,
    BranchTypeId,
    BranchDescr,
    CityId,
    CityDescr,
    DistrictId,
    DistrictDescr,
    RegionId,
    RegionDescr,
}

impl FilterField {
    pub const ALL: [FilterField; 9] = [
        FilterField::BranchNo,
        FilterField::BranchTypeId,
        FilterField::BranchDescr,
        FilterField::CityId,
        FilterField::CityDescr,
        FilterField::DistrictId,
        FilterField::DistrictDescr,
        FilterField::RegionId,
        FilterField::RegionDescr,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::BranchNo => "branchNo",
            FilterField::BranchTypeId => "branchTypeID",
            FilterField::BranchDescr => "branchDescr",
            FilterField::CityId => "cityID",
            FilterField::CityDescr => "cityDescr",
            FilterField::DistrictId => "districtID",
            FilterField::DistrictDescr => "districtDescr",
            FilterField::RegionId => "regionID",
            FilterField::RegionDescr => "regionDescr",
        }
    }

    /// Exact, case sensitive match on the wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

/// Whitelisted search filters, serialized as a flat JSON object.
///
/// Keys keep the order in which the caller supplied them. Unknown keys and
/// `null` values never make it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterSet(Map<String, Value>);

impl FilterSet {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Keep only recognised fields out of arbitrary caller input
    pub fn from_input<I, K, V>(input: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut filters = Self::new();
        for (key, value) in input {
            let key = key.as_ref();
            match FilterField::from_name(key) {
                Some(field) => filters.insert(field, value),
                None => debug!(field = key, "dropping unrecognised branch filter"),
            }
        }
        filters
    }

    pub fn with(mut self, field: FilterField, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: FilterField, value: impl Into<Value>) {
        match value.into() {
            Value::Null => {
                self.0.shift_remove(field.as_str());
            }
            value => {
                self.0.insert(field.as_str().to_owned(), value);
            }
        }
    }

    pub fn get(&self, field: FilterField) -> Option<&Value> {
        self.0.get(field.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<Map<String, Value>> for FilterSet {
    fn from(input: Map<String, Value>) -> Self {
        Self::from_input(input)
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSet
where
    K: AsRef<str>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_input(iter)
    }
}

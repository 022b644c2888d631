/// Active search filters for one fetch cycle. Immutable once a cycle starts;
/// a change of filters triggers a reset fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
}

impl FilterSet {
    /// True when no filter field carries a non-empty value.
    pub fn is_empty(&self) -> bool {
        !self.has_keyword() && !has_value(&self.location) && !has_value(&self.category)
    }

    pub fn has_keyword(&self) -> bool {
        has_value(&self.keyword)
    }
}

fn has_value(field: &Option<String>) -> bool {
    field.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

use serde::Deserialize;

/// Raw event record as returned by the Discovery API. Every field is
/// optional; the provider omits whole subtrees without warning.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub info: Option<String>,
    pub dates: Option<ProviderDates>,
    pub images: Option<Vec<ProviderImage>>,
    #[serde(rename = "priceRanges")]
    pub price_ranges: Option<Vec<ProviderPriceRange>>,
    pub classifications: Option<Vec<ProviderClassification>>,
    pub promoter: Option<ProviderPromoter>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<ProviderEmbedded>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderDates {
    pub start: Option<ProviderStart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderStart {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderImage {
    pub url: Option<String>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderPriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderClassification {
    pub segment: Option<ProviderSegment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderSegment {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderPromoter {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderEmbedded {
    pub venues: Option<Vec<ProviderVenue>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderVenue {
    pub name: Option<String>,
    pub city: Option<ProviderCity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderCity {
    pub name: Option<String>,
}

/// Platform category labels mapped to the provider's segment ids. Labels the
/// provider has no segment for map onto its closest umbrella segment.
const SEGMENT_TABLE: &[(&str, &str)] = &[
    ("music", "KZFzniwnSyZfZ7v7nJ"),
    ("concerts", "KZFzniwnSyZfZ7v7nJ"),
    ("sports", "KZFzniwnSyZfZ7v7nE"),
    ("arts", "KZFzniwnSyZfZ7v7na"),
    ("theatre", "KZFzniwnSyZfZ7v7na"),
    ("comedy", "KZFzniwnSyZfZ7v7na"),
    ("film", "KZFzniwnSyZfZ7v7nn"),
    ("family", "KZFzniwnSyZfZ7v7n1"),
    ("festivals", "KZFzniwnSyZfZ7v7nJ"),
    ("workshops", "KZFzniwnSyZfZ7v7n1"),
];

/// Resolve a platform category label to the provider's classification id.
/// Unknown labels resolve to `None`, meaning no external filter is applied:
/// an unmapped category must not zero out external results.
pub fn resolve_classification(label: Option<&str>) -> Option<String> {
    let label = label?.trim();
    if label.is_empty() {
        return None;
    }

    let needle = label.to_lowercase();
    SEGMENT_TABLE
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, id)| (*id).to_string())
}

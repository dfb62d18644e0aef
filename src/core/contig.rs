use crate::core::types::NamingConvention;

/// Prefix carried by every contig name under the UCSC convention
pub const CHR_PREFIX: &str = "chr";

/// Mitochondrial contig name under each convention.
///
/// This is the only contig whose name differs by more than the `chr` prefix.
const MITOCHONDRIAL_PREFIXED: &str = "chrM";
const MITOCHONDRIAL_BARE: &str = "MT";

/// Detect the naming convention used by a set of contig names
///
/// Any name starting with `chr` makes the set [`NamingConvention::Prefixed`].
/// An empty set is [`NamingConvention::Bare`].
pub fn detect_naming_convention<I, S>(names: I) -> NamingConvention
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if names
        .into_iter()
        .any(|name| name.as_ref().starts_with(CHR_PREFIX))
    {
        NamingConvention::Prefixed
    } else {
        NamingConvention::Bare
    }
}

/// Translate a contig name from one naming convention to another.
///
/// Names that do not follow the source convention are returned unchanged.
#[must_use]
pub fn normalize_contig_name(name: &str, from: NamingConvention, to: NamingConvention) -> String {
    if from == to {
        return name.to_string();
    }

    if let Some(alias) = mitochondrial_alias(name, to) {
        return alias.to_string();
    }

    match to {
        NamingConvention::Bare => name.strip_prefix(CHR_PREFIX).unwrap_or(name).to_string(),
        NamingConvention::Prefixed if name.starts_with(CHR_PREFIX) => name.to_string(),
        NamingConvention::Prefixed => format!("{CHR_PREFIX}{name}"),
    }
}

/// Mitochondrial name under `to`, if `name` is the mitochondrion under the other convention
fn mitochondrial_alias(name: &str, to: NamingConvention) -> Option<&'static str> {
    match (name, to) {
        (MITOCHONDRIAL_PREFIXED, NamingConvention::Bare) => Some(MITOCHONDRIAL_BARE),
        (MITOCHONDRIAL_BARE, NamingConvention::Prefixed) => Some(MITOCHONDRIAL_PREFIXED),
        _ => None,
    }
}

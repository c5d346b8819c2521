use std::cmp::Ordering;

/// One dot- or dash-separated piece of a version string
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Number(u64),
    Text(String),
}

fn segments(s: &str) -> Vec<Segment> {
    s.split(['.', '-', '+'])
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<u64>() {
            Ok(n) => Segment::Number(n),
            Err(_) => Segment::Text(part.to_string()),
        })
        .collect()
}

/// Compare two dotted segment lists; on a common prefix the longer one wins
fn compare_segments(a: &[Segment], b: &[Segment]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.cmp(y))
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Compare loader version strings such as `0.18.1` or `0.19.0-beta.3`.
///
/// Numeric segments compare numerically. A pre-release (`base-tag`) sorts
/// before its plain base version.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a_base, a_tag) = split_tag(a);
    let (b_base, b_tag) = split_tag(b);

    match compare_segments(&segments(a_base), &segments(b_base)) {
        Ordering::Equal => {}
        ord => return ord,
    }

    match (a_tag, b_tag) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(at), Some(bt)) => compare_segments(&segments(at), &segments(bt)),
    }
}

fn split_tag(v: &str) -> (&str, Option<&str>) {
    match v.trim().split_once('-') {
        Some((base, tag)) => (base, Some(tag)),
        None => (v.trim(), None),
    }
}

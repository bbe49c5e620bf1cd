//! Human-readable store reports.

use accum_store::Store;
use accum_types::Artifact;

use crate::error::QueryResult;
use crate::pattern::{ObjectPattern, SelectPattern};

/// Render the store header and, when `option` is a non-empty selection
/// pattern, every matching key with one line per matching artifact.
///
/// Within a key, artifacts are listed by name. Artifacts without entries
/// are skipped unless the store shows empty objects. An object pattern of
/// `*` without class filter lists the matching keys only; `-` lists the
/// matching keys without any artifact.
pub fn render(store: &Store, option: &str) -> QueryResult<String> {
    let mut lines = vec![format!(
        "Store({},{}) : {} keys and {} objects",
        store.name(),
        store.title(),
        store.number_of_keys(),
        store.number_of_artifacts()
    )];
    if option.is_empty() {
        return Ok(finish(lines));
    }

    let pattern = SelectPattern::parse(option)?;
    let keys_only = matches!(pattern.object(), ObjectPattern::Any) && !pattern.has_class_filter();
    let hide_names = matches!(pattern.object(), ObjectPattern::Hidden);

    lines.push(format!("Number of identifiers {}", store.number_of_keys()));

    for (key, bag) in store.bags() {
        if !pattern.matches_key(key) {
            continue;
        }
        if keys_only || hide_names {
            lines.push(key.to_string());
            continue;
        }

        let mut matched: Vec<&Artifact> = bag
            .iter()
            .filter(|a| pattern.matches_artifact(a))
            .filter(|a| store.show_empty_objects() || !a.is_empty())
            .collect();
        if matched.is_empty() {
            continue;
        }
        matched.sort_by(|a, b| a.name().cmp(b.name()));

        lines.push(key.to_string());
        lines.extend(matched.into_iter().map(summary_line));
    }
    Ok(finish(lines))
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `    (class) ! name | details`, where `!` flags a non-finite mean.
pub fn summary_line(artifact: &Artifact) -> String {
    let (flag, details) = match artifact {
        Artifact::Histogram(h) => (
            "   ",
            Some(format!(
                "{} | Entries={} Sum={}",
                h.title(),
                h.entries(),
                h.sum_of_weights()
            )),
        ),
        Artifact::Profile(p) => (
            "   ",
            Some(format!(
                "{} | Entries={} Sum={}",
                p.title(),
                p.entries(),
                p.sum_of_weights()
            )),
        ),
        Artifact::Sparse(s) => (
            "   ",
            Some(format!(
                "{} | Entries={} Bins={}",
                s.title(),
                s.entries(),
                s.occupied_bins()
            )),
        ),
        Artifact::Graph(g) => {
            let mean = g.mean_y();
            (
                if mean.is_finite() { "   " } else { " ! " },
                Some(format!(
                    "{} | Npts={} Mean={} RMS={}",
                    g.title(),
                    g.len(),
                    mean,
                    g.rms_y()
                )),
            )
        }
        Artifact::Counter(c) => ("   ", Some(format!("Value={} Entries={}", c.value(), c.entries()))),
        Artifact::Opaque(_) => ("   ", None),
    };

    let mut line = format!("    ({}) {} {}", artifact.class_tag(), flag, artifact.name());
    if let Some(details) = details {
        line.push_str(" | ");
        line.push_str(&details);
    }
    line
}

/// The store's lookup-miss log, one line per distinct message.
pub fn render_messages(store: &Store, prefix: &str) -> String {
    store.render_messages(prefix)
}

#[cfg(test)]
mod tests {
    use accum_types::{Axis, BinStorage, Counter, Graph, Histogram, PathKey};

    use super::*;

    fn store() -> Store {
        let mut store = Store::new("HC", "hits");
        let mut h = Histogram::new_1d("Charge", "charge", BinStorage::Float, Axis::new(4, 0.0, 4.0));
        h.fill(&[1.0], 2.0);
        store.adopt_at("/DIGITS/", h.into()).unwrap();
        let empty = Histogram::new_1d("Empty", "", BinStorage::Float, Axis::new(4, 0.0, 4.0));
        store.adopt_at("/DIGITS/", empty.into()).unwrap();
        store.adopt_at("/DIGITS/", Counter::with_value("Adc", 3.0).into()).unwrap();
        store.adopt_at("/OTHER/", Graph::new("g", "graph").into()).unwrap();
        store
    }

    #[test]
    fn header_only_without_option() {
        assert_eq!(
            render(&store(), "").unwrap(),
            "Store(HC,hits) : 2 keys and 4 objects\n"
        );
    }

    #[test]
    fn lists_matches_sorted_and_hides_empty() {
        let out = render(&store(), "/DIGITS/*:*").unwrap();
        let expected = "\
Store(HC,hits) : 2 keys and 4 objects
Number of identifiers 2
/DIGITS/
    (Counter)     Adc | Value=3 Entries=1
    (TH1F)     Charge | charge | Entries=1 Sum=2
";
        assert_eq!(out, expected);
    }

    #[test]
    fn shows_empty_when_configured() {
        let mut store = store();
        store.set_show_empty_objects(true);
        let out = render(&store, "/DIGITS/Empty").unwrap();
        assert!(out.contains("(TH1F)     Empty"));
    }

    #[test]
    fn star_lists_keys_only() {
        let out = render(&store(), "/*/*").unwrap();
        assert!(out.ends_with("Number of identifiers 2\n/DIGITS/\n/OTHER/\n"));
    }

    #[test]
    fn dash_lists_keys_without_names() {
        let out = render(&store(), "/OTHER/-").unwrap();
        assert!(out.ends_with("Number of identifiers 2\n/OTHER/\n"));
    }

    #[test]
    fn empty_graph_is_flagged() {
        let line = summary_line(&Graph::new("g", "t").into());
        assert!(line.starts_with("    (TGraph)  !  g | t | Npts=0"));
    }

    #[test]
    fn messages_are_rendered_with_counts() {
        let store = store();
        store.lookup(&PathKey::normalize("/NOPE/"), "x");
        store.lookup(&PathKey::normalize("/NOPE/"), "x");
        assert_eq!(
            render_messages(&store, "HC"),
            "HC : message Did not find bag for key=/NOPE/ appeared     2 times\n"
        );
    }
}

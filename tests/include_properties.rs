// tests/include_properties.rs

use std::sync::Arc;

use proptest::prelude::*;

use assetflow::fs::mock::MockFileSystem;
use assetflow::pipeline::source::glob_base;
use assetflow::stages::TemplateInclude;

fn include_with(fragments: &[(&str, &str)]) -> TemplateInclude {
    let fs = MockFileSystem::new();
    for (name, body) in fragments {
        fs.add_file(format!("/site/components/{name}"), body.as_bytes().to_vec());
    }
    TemplateInclude::new(Arc::new(fs), "/site/components").unwrap()
}

proptest! {
    // Text without include calls passes through untouched, including
    // top-level `@@key` markers.
    #[test]
    fn text_without_includes_is_unchanged(text in "(@@[a-z]{1,6}|[^@(]){0,64}") {
        let include = include_with(&[]);
        prop_assert_eq!(include.resolve(&text).unwrap(), text);
    }

    #[test]
    fn an_include_is_replaced_by_its_fragment_in_place(
        before in "[^@]{0,32}",
        after in "[^@]{0,32}",
        fragment in "[^@]{0,32}",
    ) {
        let include = include_with(&[("part.html", fragment.as_str())]);
        let page = format!("{before}@@include('part.html'){after}");
        prop_assert_eq!(include.resolve(&page).unwrap(), format!("{before}{fragment}{after}"));
    }

    // Resolved output carries no include calls, so resolving it again is a
    // no-op.
    #[test]
    fn resolving_twice_equals_resolving_once(
        pieces in proptest::collection::vec(
            prop_oneof![
                "[^@(]{0,16}",
                Just("@@include('a.html')".to_string()),
                Just("@@include(\"b.html\", {\"title\": \"T\"})".to_string()),
            ],
            0..8,
        ),
        a in "[^@(]{0,24}",
        b in "[^@(]{0,24}",
    ) {
        let b = format!("<h1>@@title</h1>{b}");
        let include = include_with(&[("a.html", a.as_str()), ("b.html", b.as_str())]);
        let page = pieces.concat();

        let once = include.resolve(&page).unwrap();
        let twice = include.resolve(&once).unwrap();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn glob_bases_never_contain_glob_syntax(
        dirs in proptest::collection::vec("[a-z]{1,8}", 0..4),
        tail in prop_oneof![Just("**/*.html"), Just("*.{jpg,png}"), Just("main.scss")],
    ) {
        let mut parts = dirs.clone();
        parts.push(tail.to_string());
        let base = glob_base(&parts.join("/"));
        let base = base.to_string_lossy().into_owned();
        let has_meta = base.contains(['*', '{', '?', '[']);
        prop_assert!(!has_meta, "base {:?} has glob syntax", base);
        prop_assert_eq!(base, dirs.join("/"));
    }
}

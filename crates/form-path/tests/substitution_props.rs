use form_path::{FieldPath, Segment};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = Segment> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(Segment::Key),
        (0usize..50).prop_map(Segment::Index),
        Just(Segment::Placeholder),
    ]
}

fn path() -> impl Strategy<Value = FieldPath> {
    prop::collection::vec(segment(), 0..8).prop_map(FieldPath::new)
}

proptest! {
    #[test]
    fn substitute_never_changes_length(p in path(), idx in prop::collection::vec(0usize..20, 0..6)) {
        prop_assert_eq!(p.substitute(&idx).len(), p.len());
    }

    #[test]
    fn substitute_consumes_indices_in_order(p in path(), idx in prop::collection::vec(0usize..20, 0..6)) {
        let out = p.substitute(&idx);
        let filled = p.placeholder_count().min(idx.len());
        prop_assert_eq!(out.placeholder_count(), p.placeholder_count() - filled);

        let new_indices: Vec<usize> = p
            .segments()
            .iter()
            .zip(out.segments())
            .filter_map(|(before, after)| match (before, after) {
                (Segment::Placeholder, Segment::Index(i)) => Some(*i),
                _ => None,
            })
            .collect();
        prop_assert_eq!(&new_indices[..], &idx[..filled]);
    }

    #[test]
    fn abstracted_paths_substitute_back(p in path()) {
        let concrete = p.substitute(&vec![0; p.placeholder_count()]);
        let indices = concrete.indices();
        prop_assert_eq!(concrete.abstract_indices().substitute(&indices), concrete);
    }

    #[test]
    fn dotted_round_trip(p in path()) {
        prop_assert_eq!(FieldPath::from_dotted(&p.to_dotted()), p);
    }
}

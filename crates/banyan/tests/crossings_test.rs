use banyan::crossings::{Segment, count_segment_crossings, crossing_pairs, tree_segments};
use banyan::geom::point;
use banyan::{Record, Tree, count_crossings};

fn star(n: usize) -> Tree {
    let mut records = vec![Record::root("hub")];
    for i in 0..n {
        records.push(Record::child(format!("leaf{i}"), "hub"));
    }
    Tree::from_records(&records).unwrap()
}

#[test]
fn star_has_no_crossings_wherever_the_leaves_are() {
    let mut tree = star(12);
    tree.set_position(tree.root(), point(0.0, 0.0));
    let leaves: Vec<_> = tree.node(tree.root()).children().to_vec();
    // Leaves on a circle, then some deliberately overlapping spokes.
    for (i, &leaf) in leaves.iter().enumerate() {
        let angle = i as f64 * std::f64::consts::TAU / leaves.len() as f64;
        let radius = if i % 2 == 0 { 10.0 } else { 20.0 };
        tree.set_position(leaf, point(radius * angle.cos(), radius * angle.sin()));
    }
    assert_eq!(count_crossings(&tree), 0);

    tree.set_position(leaves[1], point(5.0, 0.0));
    tree.set_position(leaves[2], point(7.0, 0.0));
    assert_eq!(count_crossings(&tree), 0);
}

#[test]
fn x_pattern_counts_exactly_one_crossing() {
    let segments = [
        Segment {
            from: "p1",
            to: "q1",
            a: point(0.0, 0.0),
            b: point(10.0, 10.0),
        },
        Segment {
            from: "p2",
            to: "q2",
            a: point(0.0, 10.0),
            b: point(10.0, 0.0),
        },
    ];
    assert_eq!(count_segment_crossings(&segments), 1);
}

#[test]
fn collinear_overlap_counts_as_crossing() {
    let segments = [
        Segment {
            from: 0,
            to: 1,
            a: point(0.0, 0.0),
            b: point(10.0, 0.0),
        },
        Segment {
            from: 2,
            to: 3,
            a: point(5.0, 0.0),
            b: point(15.0, 0.0),
        },
    ];
    assert_eq!(count_segment_crossings(&segments), 1);
}

#[test]
fn tree_edges_crossing_in_an_x() {
    // r has children a and b; a has child c, b has child d. Edge a-c crosses edge b-d.
    let mut tree = Tree::from_records(&[
        Record::root("r"),
        Record::child("a", "r"),
        Record::child("b", "r"),
        Record::child("c", "a"),
        Record::child("d", "b"),
    ])
    .unwrap();
    let at = |t: &Tree, id: &str| t.get(&id.into()).unwrap();
    let (r, a, b, c, d) = (
        tree.root(),
        at(&tree, "a"),
        at(&tree, "b"),
        at(&tree, "c"),
        at(&tree, "d"),
    );
    tree.set_position(r, point(5.0, -10.0));
    tree.set_position(a, point(0.0, 0.0));
    tree.set_position(b, point(10.0, 0.0));
    tree.set_position(c, point(10.0, 10.0));
    tree.set_position(d, point(0.0, 10.0));

    assert_eq!(count_crossings(&tree), 1);
    let segments = tree_segments(&tree);
    let pairs = crossing_pairs(&segments);
    assert_eq!(pairs.len(), 1);
    let (i, j) = pairs[0];
    let mut children = [segments[i].to, segments[j].to];
    children.sort();
    let mut expected = [c, d];
    expected.sort();
    assert_eq!(children, expected);
}

//! Tests for sub-rules and transformation candidates

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use gridrule::algorithm::candidates::{
        ObjectAction, ObjectSelector, SubRule, TransformationCandidate, complete_symmetry,
    };
    use gridrule::analysis::patterns::PartitionScheme;
    use gridrule::spatial::grid::{Grid, PositionClass};
    use gridrule::spatial::objects::{Connectivity, ExtractionParams, Segmentation};
    use gridrule::spatial::transform::Dihedral;

    fn grid(rows: &[&[u8]]) -> Grid {
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        Grid::from_rows(&rows).expect("valid test grid")
    }

    fn swap() -> SubRule {
        SubRule::Remap([(0, 1), (1, 0)].into_iter().collect())
    }

    fn object_rule(selector: ObjectSelector, action: ObjectAction) -> SubRule {
        SubRule::Object {
            params: ExtractionParams::default(),
            selector,
            action,
        }
    }

    // Tests the symbol swap and its description
    #[test]
    fn test_remap() {
        let rule = swap();
        let applied = rule.apply(&grid(&[&[1, 1], &[0, 1]])).expect("applies");
        assert_eq!(applied, grid(&[&[0, 0], &[1, 0]]));
        assert_eq!(rule.to_string(), "remap{0->1, 1->0}");
        assert_eq!(rule.complexity(), 1);
    }

    // Tests positional remapping only touches the named position class
    #[test]
    fn test_positional_remap() {
        let mut table = BTreeMap::new();
        table.insert((PositionClass::Corner, 0), 7);
        let rule = SubRule::PositionalRemap(table);
        let applied = rule.apply(&Grid::filled(3, 3, 0).expect("valid grid")).expect("applies");
        assert_eq!(
            applied,
            grid(&[&[7, 0, 7], &[0, 0, 0], &[7, 0, 7]])
        );
        assert_eq!(rule.complexity(), 2);
        assert_eq!(rule.to_string(), "positional_remap{Corner:0->7}");
    }

    // Tests whole-grid steps and their size failures
    #[test]
    fn test_global_scale_tile() {
        let g = grid(&[&[1, 2]]);
        assert_eq!(
            SubRule::Global(Dihedral::FlipCols).apply(&g),
            Some(grid(&[&[2, 1]]))
        );
        assert_eq!(
            SubRule::Scale { rows: 2, cols: 1 }.apply(&g),
            Some(grid(&[&[1, 2], &[1, 2]]))
        );
        assert_eq!(
            SubRule::Tile { rows: 1, cols: 2 }.apply(&g),
            Some(grid(&[&[1, 2, 1, 2]]))
        );
        assert_eq!(SubRule::Scale { rows: 0, cols: 1 }.apply(&g), None);
        assert_eq!(SubRule::Global(Dihedral::Identity).complexity(), 0);
        assert_eq!(SubRule::Scale { rows: 2, cols: 2 }.to_string(), "scale(2x2)");
    }

    // Tests symmetry completion fills background from the mirror cell
    // Verified by filling from the first orbit cell regardless of symbol
    #[test]
    fn test_complete_symmetry() {
        let g = grid(&[&[1, 0, 0], &[0, 2, 3]]);
        let completed = complete_symmetry(&g, Dihedral::FlipCols, 0).expect("shape kept");
        assert_eq!(completed, grid(&[&[1, 0, 1], &[3, 2, 3]]));
        assert!(complete_symmetry(&g, Dihedral::Transpose, 0).is_none());
    }

    // Tests object translation erases before painting
    #[test]
    fn test_object_translate() {
        let rule = object_rule(ObjectSelector::All, ObjectAction::Translate { dr: 0, dc: 1 });
        let applied = rule.apply(&grid(&[&[1, 1, 0, 0]])).expect("applies");
        assert_eq!(applied, grid(&[&[0, 1, 1, 0]]));
        assert_eq!(rule.complexity(), 2);
        assert_eq!(
            rule.to_string(),
            "objects[4-connected same_symbol, all]: translate(0,1)"
        );
    }

    // Tests selectors restrict which objects change
    #[test]
    fn test_object_selectors() {
        let g = grid(&[&[1, 1, 0, 2], &[0, 0, 0, 0]]);
        let recolor_largest = object_rule(ObjectSelector::Largest, ObjectAction::Recolor(5));
        assert_eq!(
            recolor_largest.apply(&g),
            Some(grid(&[&[5, 5, 0, 2], &[0, 0, 0, 0]]))
        );
        let recolor_symbol = object_rule(ObjectSelector::Symbol(2), ObjectAction::Recolor(4));
        assert_eq!(
            recolor_symbol.apply(&g),
            Some(grid(&[&[1, 1, 0, 4], &[0, 0, 0, 0]]))
        );
        let resize_smallest = object_rule(ObjectSelector::Smallest, ObjectAction::Resize(2));
        assert_eq!(
            resize_smallest.apply(&g),
            Some(grid(&[&[1, 1, 0, 2], &[0, 0, 0, 2]])),
            "Resized object is clipped at the grid border"
        );
        assert_eq!(ObjectSelector::Symbol(2).complexity(), 1);
        assert_eq!(ObjectAction::Recolor(3).complexity(), 1);
    }

    // Tests objects moved off the grid are clipped
    #[test]
    fn test_object_translate_clips() {
        let rule = object_rule(ObjectSelector::All, ObjectAction::Translate { dr: 0, dc: -1 });
        assert_eq!(rule.apply(&grid(&[&[3, 0, 0]])), Some(grid(&[&[0, 0, 0]])));
    }

    // Tests in-place reflection and rotation of objects
    #[test]
    fn test_object_reflect_and_rotate() {
        let g = grid(&[&[1, 2, 0], &[0, 0, 0]]);
        let params = ExtractionParams::new(Connectivity::Four, Segmentation::Foreground, 0);
        let reflect = SubRule::Object {
            params,
            selector: ObjectSelector::All,
            action: ObjectAction::Reflect(Dihedral::FlipCols),
        };
        assert_eq!(reflect.apply(&g), Some(grid(&[&[2, 1, 0], &[0, 0, 0]])));

        let rotate = SubRule::Object {
            params,
            selector: ObjectSelector::All,
            action: ObjectAction::Rotate(1),
        };
        assert_eq!(rotate.apply(&g), Some(grid(&[&[1, 0, 0], &[2, 0, 0]])));
        assert_eq!(ObjectAction::Rotate(3).to_string(), "rotate(270)");
    }

    // Tests per-part transforms and partitions that do not apply
    #[test]
    fn test_partition_wise() {
        let rule = SubRule::PartitionWise {
            scheme: PartitionScheme::ColumnBands(2),
            inner: Dihedral::FlipCols,
            background: 0,
        };
        assert_eq!(
            rule.apply(&grid(&[&[1, 2, 3, 4]])),
            Some(grid(&[&[2, 1, 4, 3]]))
        );
        assert_eq!(rule.apply(&grid(&[&[1, 2, 3]])), None);
        assert_eq!(rule.complexity(), 3);
        assert_eq!(rule.to_string(), "per_part[column_bands(2)]: flip_cols");
    }

    // Tests candidates chain steps and fail when any step fails
    // Verified by skipping inapplicable steps instead of failing
    #[test]
    fn test_candidate_chain() {
        let candidate = TransformationCandidate::new(
            vec![swap(), SubRule::Global(Dihedral::FlipCols)],
            0,
        );
        assert_eq!(candidate.complexity, 3);
        assert_eq!(
            candidate.apply(&grid(&[&[1, 0, 0]])),
            Some(grid(&[&[1, 1, 0]]))
        );
        assert_eq!(candidate.to_string(), "remap{0->1, 1->0} then flip_cols");

        let failing = TransformationCandidate::new(
            vec![SubRule::Tile { rows: 0, cols: 1 }, swap()],
            1,
        );
        assert_eq!(failing.apply(&grid(&[&[1]])), None);
    }

    // Tests the empty candidate is the identity
    #[test]
    fn test_identity_candidate() {
        let candidate = TransformationCandidate::new(Vec::new(), 0);
        let g = grid(&[&[3, 4]]);
        assert!(candidate.is_identity());
        assert_eq!(candidate.apply(&g), Some(g.clone()));
        assert_eq!(candidate.to_string(), "identity");
        assert!(candidate.reproduces(&[(g.clone(), g)]));
    }

    // Tests reproduction requires every pair to match exactly
    #[test]
    fn test_reproduces() {
        let candidate = TransformationCandidate::new(vec![swap()], 0);
        let good = (grid(&[&[1, 0]]), grid(&[&[0, 1]]));
        let bad = (grid(&[&[1, 1]]), grid(&[&[0, 1]]));
        assert!(candidate.reproduces(std::slice::from_ref(&good)));
        assert!(!candidate.reproduces(&[good, bad]));
        assert_eq!(candidate.rank_key(), (0.0, 1, 0));
    }
}

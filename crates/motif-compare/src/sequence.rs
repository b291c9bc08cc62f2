//! Sequence alignment text from a residue alignment
//!
//! Descriptor A's residues are walked in order, each paired with its aligned
//! B residue or `.`. Unaligned B residues are spliced in right after the
//! column of the closest preceding aligned B residue, or at the front when
//! no aligned residue precedes them.

use std::collections::BTreeMap;

use ahash::AHashMap;
use motif_mol::{DescriptorsPair, ResidueKey};

use crate::alignment::Alignment;
use crate::result::SequenceAlignment;

const GAP: char = '.';

/// Build the two-row alignment text for `alignment` over `pair`
pub fn sequence_alignment(pair: DescriptorsPair<'_>, alignment: &Alignment<'_>) -> SequenceAlignment {
    let matched: AHashMap<&ResidueKey, &ResidueKey> = alignment
        .residue_pairs()
        .map(|(a, b)| (&a.key, &b.key))
        .collect();

    let first_residues = pair.first.residues();
    let second_residues = pair.second.residues();
    let second_by_key: AHashMap<&ResidueKey, char> = second_residues
        .iter()
        .map(|r| (&r.key, r.one_letter()))
        .collect();

    let mut first_row = Vec::with_capacity(first_residues.len());
    let mut second_row = Vec::with_capacity(first_residues.len());
    let mut column_of: AHashMap<&ResidueKey, usize> = AHashMap::new();
    for (column, residue) in first_residues.iter().enumerate() {
        first_row.push(residue.one_letter());
        match matched.get(&residue.key) {
            Some(&partner) => {
                second_row.push(second_by_key.get(partner).copied().unwrap_or(GAP));
                column_of.insert(partner, column);
            }
            None => second_row.push(GAP),
        }
    }

    let mut leading = Vec::new();
    let mut after: BTreeMap<usize, Vec<char>> = BTreeMap::new();
    let mut anchor: Option<usize> = None;
    for residue in &second_residues {
        match column_of.get(&residue.key) {
            Some(&column) => anchor = Some(column),
            None => match anchor {
                Some(column) => after.entry(column).or_default().push(residue.one_letter()),
                None => leading.push(residue.one_letter()),
            },
        }
    }

    let mut out = SequenceAlignment::default();
    for code in leading {
        out.first.push(GAP);
        out.second.push(code);
    }
    for (column, (a, b)) in first_row.into_iter().zip(second_row).enumerate() {
        out.first.push(a);
        out.second.push(b);
        for &code in after.get(&column).into_iter().flatten() {
            out.first.push(GAP);
            out.second.push(code);
        }
    }
    out
}

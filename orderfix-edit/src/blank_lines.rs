//! Blank-line conventions at the edges a move touches.
//!
//! Doc comments always travel with their declaration. Blank-line counts at container edges
//! stay with the edge: whichever declaration is first (or last) after the move takes over the
//! leading (or trailing) count that belonged to that position.

use orderfix_types::container::Sibling;
use orderfix_types::decor::Decoration;
use std::collections::BTreeMap;

/// Remove the sibling at `from`, handing its edge blank lines to the new edge declaration.
pub(crate) fn detach(siblings: &mut Vec<Sibling>, from: usize) -> Sibling {
    let mut moved = siblings.remove(from);
    if siblings.is_empty() {
        return moved;
    }

    if from == 0 {
        std::mem::swap(
            &mut moved.decor.leading_blank_lines,
            &mut siblings[0].decor.leading_blank_lines,
        );
    }
    if from == siblings.len() {
        let last = siblings.len() - 1;
        std::mem::swap(
            &mut moved.decor.trailing_blank_lines,
            &mut siblings[last].decor.trailing_blank_lines,
        );
    }
    moved
}

/// Insert `moved` at `to`, adopting the blank-line convention of its new neighbours.
pub(crate) fn attach(siblings: &mut Vec<Sibling>, mut moved: Sibling, to: usize) {
    let len = siblings.len();
    if len == 0 {
        siblings.push(moved);
        return;
    }

    if to == 0 {
        std::mem::swap(
            &mut moved.decor.leading_blank_lines,
            &mut siblings[0].decor.leading_blank_lines,
        );
    } else if to < len {
        moved.decor.leading_blank_lines = siblings[to].decor.leading_blank_lines;
    }

    if to >= len {
        std::mem::swap(
            &mut moved.decor.trailing_blank_lines,
            &mut siblings[len - 1].decor.trailing_blank_lines,
        );
        siblings.push(moved);
    } else {
        siblings.insert(to, moved);
    }
}

/// Give declarations that gained marker halves the separation a marker line needs: a blank line
/// before an open unless first, after a close unless last.
pub(crate) fn separate_markers(before: &[Sibling], after: &mut [Sibling]) {
    let previous: BTreeMap<_, &Decoration> = before.iter().map(|s| (s.id, &s.decor)).collect();
    let last = after.len().saturating_sub(1);

    for (pos, s) in after.iter_mut().enumerate() {
        let Some(old) = previous.get(&s.id) else {
            continue;
        };
        if pos > 0 && !s.decor.region_opens.is_empty() && s.decor.region_opens != old.region_opens
        {
            s.decor.leading_blank_lines = s.decor.leading_blank_lines.max(1);
        }
        if pos < last
            && !s.decor.region_closes.is_empty()
            && s.decor.region_closes != old.region_closes
        {
            s.decor.trailing_blank_lines = s.decor.trailing_blank_lines.max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderfix_types::container::DeclId;

    fn sib(id: u32, leading: u32, trailing: u32) -> Sibling {
        Sibling {
            id: DeclId(id),
            decor: Decoration::default()
                .with_blank_lines(leading, trailing)
                .with_doc(format!("/// {id}")),
        }
    }

    fn blanks(s: &[Sibling]) -> Vec<(u32, u32, u32)> {
        s.iter()
            .map(|s| {
                (
                    s.id.0,
                    s.decor.leading_blank_lines,
                    s.decor.trailing_blank_lines,
                )
            })
            .collect()
    }

    #[test]
    fn detaching_first_hands_leading_to_new_first() {
        let mut s = vec![sib(0, 0, 0), sib(1, 1, 0), sib(2, 1, 0)];
        let moved = detach(&mut s, 0);
        assert_eq!(moved.decor.leading_blank_lines, 1);
        assert_eq!(blanks(&s), vec![(1, 0, 0), (2, 1, 0)]);
        assert_eq!(moved.decor.doc_comment.as_deref(), Some("/// 0"));
    }

    #[test]
    fn detaching_last_hands_trailing_to_new_last() {
        let mut s = vec![sib(0, 0, 0), sib(1, 1, 0), sib(2, 1, 2)];
        let moved = detach(&mut s, 2);
        assert_eq!(moved.decor.trailing_blank_lines, 0);
        assert_eq!(blanks(&s), vec![(0, 0, 0), (1, 1, 2)]);
    }

    #[test]
    fn attaching_first_takes_the_edge() {
        let mut s = vec![sib(0, 0, 0), sib(1, 1, 0)];
        attach(&mut s, sib(9, 1, 0), 0);
        assert_eq!(blanks(&s), vec![(9, 0, 0), (0, 1, 0), (1, 1, 0)]);
    }

    #[test]
    fn attaching_in_the_middle_copies_the_neighbour() {
        let mut s = vec![sib(0, 0, 0), sib(1, 2, 0)];
        attach(&mut s, sib(9, 0, 0), 1);
        assert_eq!(blanks(&s), vec![(0, 0, 0), (9, 2, 0), (1, 2, 0)]);
    }

    #[test]
    fn attaching_last_takes_trailing() {
        let mut s = vec![sib(0, 0, 0), sib(1, 1, 1)];
        attach(&mut s, sib(9, 1, 0), 2);
        assert_eq!(blanks(&s), vec![(0, 0, 0), (1, 1, 0), (9, 1, 1)]);
    }

    #[test]
    fn new_marker_hosts_get_separated() {
        let before = vec![sib(0, 0, 0), sib(1, 0, 0), sib(2, 0, 0)];
        let mut after = before.clone();
        after[1].decor = after[1].decor.clone().open("Group").close();
        separate_markers(&before, &mut after);
        assert_eq!(blanks(&after), vec![(0, 0, 0), (1, 1, 1), (2, 0, 0)]);
    }
}

//! Folding IPA modifiers, stress marks, tone letters and tie bars into the
//! segments they belong to.

use crate::unicode::{
    is_modifier_letter, is_modifier_symbol, is_stress_mark, is_tie_bar, single_char,
};

/// Combine grapheme clusters into IPA segments.
///
/// Clusters are scanned right to left. Spacing modifier letters are buffered
/// and appended to the preceding cluster; stress marks are prefixed to the
/// segment that follows them; adjacent modifier symbols merge into one
/// contour. A segment ending in a tie bar is finally joined with its
/// successor.
///
/// Modifier letters buffered when a stress mark or contour tone is reached
/// are kept and move along with it (`ˈʰa` stays `ˈʰa`), so no input code
/// point is ever lost.
pub fn combine_modifiers(graphemes: &[&str]) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(graphemes.len());
    let mut pending = String::new();

    for (i, &grapheme) in graphemes.iter().enumerate().rev() {
        let single = single_char(grapheme);

        if let Some(c) = single.filter(|&c| is_modifier_letter(c) && !is_stress_mark(c)) {
            pending.insert(0, c);
            // A modifier at the very start has nothing before it to attach
            // to, so it goes onto the segment after it.
            if i == 0 {
                prefix_last(&mut result, &mut pending);
            }
            continue;
        }

        if let Some(c) = single.filter(|&c| is_stress_mark(c)) {
            pending.insert(0, c);
            prefix_last(&mut result, &mut pending);
            continue;
        }

        if let Some(c) = single.filter(|&c| is_modifier_symbol(c)) {
            let contour = match result.last() {
                None => true,
                Some(last) => last.chars().next().is_some_and(is_modifier_symbol),
            };
            if contour {
                pending.insert(0, c);
                prefix_last(&mut result, &mut pending);
                continue;
            }
        }

        result.push(format!("{grapheme}{pending}"));
        pending.clear();
    }

    result.reverse();
    join_tie_bars(result)
}

/// Move `pending` onto the front of the last emitted segment, or emit it on
/// its own if there is none.
fn prefix_last(result: &mut Vec<String>, pending: &mut String) {
    let prefix = std::mem::take(pending);
    match result.last_mut() {
        Some(last) => last.insert_str(0, &prefix),
        None => result.push(prefix),
    }
}

fn join_tie_bars(segments: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(segments.len());
    let mut iter = segments.into_iter();
    while let Some(mut segment) = iter.next() {
        if segment.chars().next_back().is_some_and(is_tie_bar) {
            if let Some(next) = iter.next() {
                segment.push_str(&next);
            }
        }
        out.push(segment);
    }
    out
}

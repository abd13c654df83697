//! Binary index arithmetic for the virtual complete binary tree.
//!
//! An index is a string of `'0'`/`'1'`. Its length is the node's depth and its
//! value is the node's position among the `2^depth` slots at that depth.

/// Encode `num` in binary, left-padded with zeros to `width` characters.
/// Numbers that need more than `width` bits are returned unpadded.
pub fn to_binary_string(num: u64, width: usize) -> String {
    format!("{:0width$b}", num, width = width)
}

/// Depth required before inserting the node with 1-based sequence number `n`:
/// `floor(log2(n + 2))`.
pub fn target_depth(sequence: u64) -> usize {
    let n = sequence.saturating_add(2);
    (u64::BITS - 1 - n.leading_zeros()) as usize
}

/// Prefix `index` with `extra` zero bits
pub fn left_pad(index: &str, extra: usize) -> String {
    let mut padded = String::with_capacity(index.len() + extra);
    padded.extend(std::iter::repeat('0').take(extra));
    padded.push_str(index);
    padded
}

pub fn is_valid(index: &str) -> bool {
    !index.is_empty() && index.bytes().all(|b| b == b'0' || b == b'1')
}

/// True for the genesis position at any width (`"0"`, `"00"`, ...)
pub fn is_all_zero(index: &str) -> bool {
    !index.contains('1')
}

/// Index with the last bit dropped. `None` at depth 1 and below.
pub fn parent_of(index: &str) -> Option<&str> {
    if index.len() < 2 {
        return None;
    }
    Some(&index[..index.len() - 1])
}

/// `(index + "0", index + "1")`
pub fn children_of(index: &str) -> (String, String) {
    (format!("{}0", index), format!("{}1", index))
}

/// Bit-zeroing walk: for every `1` bit, scanning from the last (least
/// significant) position to the first, the index truncated to that position
/// with the position set to `0`.
///
/// Each candidate is the root of the complete subtree immediately to the left
/// of the path from the root to `index`.
pub fn ancestor_candidates(index: &str) -> Vec<String> {
    index
        .char_indices()
        .rev()
        .filter(|&(_, bit)| bit == '1')
        .map(|(pos, _)| format!("{}0", &index[..pos]))
        .collect()
}

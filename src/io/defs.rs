/// Separator between the fields of a tree file line.
pub(crate) const FIELD_SEPARATOR: char = ' ';

/// Lines of a taxid list starting with this are comments.
pub(crate) const COMMENT_PREFIX: char = '#';

/// Output file used when none is given.
pub const DEFAULT_OUTPUT_FILE: &str = "fdna_tree.txt";

/// Characters that force a Newick label into single quotes.
pub(crate) const NEWICK_SPECIAL_CHARS: &[char] =
    &[',', ';', '\t', '\n', '\r', '(', ')', ':', '[', ']', '\''];

use std::fmt;

use coolc_errors::{CodegenError, CodegenResult};
use indexmap::IndexMap;

/// Pool index is used to index items in the const pool.
pub type PoolIdx = usize;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum CoolConst {
    Str(String),
    Int(i32),
    Bool(bool)
}

impl fmt::Display for CoolConst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoolConst::Str(value) => write!(f, "{value:?}"),
            CoolConst::Int(value) => write!(f, "{value}"),
            CoolConst::Bool(value) => write!(f, "{value}")
        }
    }
}

/// A view of one pooled literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstEntry<'a> {
    pub idx: PoolIdx,
    pub value: &'a CoolConst,

    /// Position among the entries of the same kind; names the label.
    pub ordinal: usize
}

impl ConstEntry<'_> {
    /// Assembly label of the literal object.
    pub fn label(&self) -> String {
        match self.value {
            CoolConst::Str(_) => format!("str_const{}", self.ordinal),
            CoolConst::Int(_) => format!("int_const{}", self.ordinal),
            CoolConst::Bool(value) => format!("bool_const{}", *value as u8)
        }
    }
}

/// Deduplicated literal objects referenced by generated code.
///
/// The two boolean objects are always present. Every string brings the
/// integer holding its length along, since a string object points at it.
#[derive(Debug)]
pub struct ConstPool {
    entries: IndexMap<CoolConst, usize>,
    str_count: usize,
    int_count: usize
}

impl Default for ConstPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstPool {
    pub fn new() -> Self {
        let mut pool = Self {
            entries: IndexMap::new(),
            str_count: 0,
            int_count: 0
        };
        pool.insert(CoolConst::Bool(false));
        pool.insert(CoolConst::Bool(true));
        pool
    }

    pub fn insert(&mut self, constant: CoolConst) -> PoolIdx {
        if let Some(idx) = self.entries.get_index_of(&constant) {
            return idx;
        }
        let ordinal = match &constant {
            CoolConst::Str(_) => {
                self.str_count += 1;
                self.str_count - 1
            },
            CoolConst::Int(_) => {
                self.int_count += 1;
                self.int_count - 1
            },
            CoolConst::Bool(value) => *value as usize
        };
        self.entries.insert_full(constant, ordinal).0
    }

    pub fn insert_str(&mut self, value: &str) -> PoolIdx {
        self.insert_int(value.len() as i32);
        self.insert(CoolConst::Str(value.to_string()))
    }

    pub fn insert_int(&mut self, value: i32) -> PoolIdx {
        self.insert(CoolConst::Int(value))
    }

    pub fn index_of(&self, constant: &CoolConst) -> Option<PoolIdx> {
        self.entries.get_index_of(constant)
    }

    pub fn get(&self, idx: PoolIdx) -> Option<ConstEntry<'_>> {
        self.entries
            .get_index(idx)
            .map(|(value, ordinal)| ConstEntry { idx, value, ordinal: *ordinal })
    }

    /// Label of an already pooled literal.
    pub fn label_of(&self, constant: &CoolConst) -> CodegenResult<String> {
        self.index_of(constant)
            .and_then(|idx| self.get(idx))
            .map(|entry| entry.label())
            .ok_or_else(|| CodegenError::MissingConstant { value: constant.to_string() })
    }

    pub fn str_label(&self, value: &str) -> CodegenResult<String> {
        self.label_of(&CoolConst::Str(value.to_string()))
    }

    pub fn int_label(&self, value: i32) -> CodegenResult<String> {
        self.label_of(&CoolConst::Int(value))
    }

    pub fn bool_label(&self, value: bool) -> String {
        format!("bool_const{}", value as u8)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = ConstEntry<'_>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, (value, ordinal))| ConstEntry { idx, value, ordinal: *ordinal })
    }

    pub fn strings(&self) -> impl Iterator<Item = (ConstEntry<'_>, &str)> {
        self.iter().filter_map(|entry| match entry.value {
            CoolConst::Str(value) => Some((entry, value.as_str())),
            _ => None
        })
    }

    pub fn ints(&self) -> impl Iterator<Item = (ConstEntry<'_>, i32)> {
        self.iter().filter_map(|entry| match entry.value {
            CoolConst::Int(value) => Some((entry, *value)),
            _ => None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_deduplication() {
        let mut pool = ConstPool::new();

        let idx1 = pool.insert_int(42);
        let idx2 = pool.insert_int(42);

        assert_eq!(idx1, idx2, "Inserting the same constant should reuse index");
        assert_eq!(pool.ints().count(), 1);
    }

    #[test]
    fn test_string_deduplication_keeps_one_entry() {
        let mut pool = ConstPool::new();

        let a = pool.insert_str("hello");
        let len_before = pool.len();
        let b = pool.insert_str("hello");

        assert_eq!(a, b);
        assert_eq!(pool.len(), len_before);
        assert_eq!(pool.str_label("hello").unwrap(), "str_const0");
    }

    #[test]
    fn test_string_brings_its_length() {
        let mut pool = ConstPool::new();
        pool.insert_str("abc");
        assert!(pool.index_of(&CoolConst::Int(3)).is_some());
        assert_eq!(pool.int_label(3).unwrap(), "int_const0");
    }

    #[test]
    fn test_booleans_are_singletons() {
        let mut pool = ConstPool::new();
        assert_eq!(pool.len(), 2);

        let t1 = pool.insert(CoolConst::Bool(true));
        let t2 = pool.insert(CoolConst::Bool(true));
        assert_eq!(t1, t2);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(t1).unwrap().label(), "bool_const1");
        assert_eq!(pool.bool_label(false), "bool_const0");
    }

    #[test]
    fn test_labels_count_per_kind() {
        let mut pool = ConstPool::new();
        pool.insert_int(7);
        pool.insert_str("");
        pool.insert_str("xy");

        assert_eq!(pool.int_label(7).unwrap(), "int_const0");
        assert_eq!(pool.int_label(0).unwrap(), "int_const1");
        assert_eq!(pool.int_label(2).unwrap(), "int_const2");
        assert_eq!(pool.str_label("").unwrap(), "str_const0");
        assert_eq!(pool.str_label("xy").unwrap(), "str_const1");
    }

    #[test]
    fn test_missing_constant_is_an_error() {
        let pool = ConstPool::new();
        assert_eq!(
            pool.str_label("nope"),
            Err(CodegenError::MissingConstant { value: "\"nope\"".to_string() })
        );
    }
}

//! visitor pattern helpers
mod visit_entries;
pub use visit_entries::VisitEntries;

/// Visitor that receives mapping entries along with the dotted path of the mapping holding them
pub trait Visit<T: ?Sized> {
    fn visit(&mut self, prefix: &str, key: &str, value: &T);
}

// blanket impl for FnMut
impl<T: ?Sized, F> Visit<T> for F
where
    F: FnMut(&str, &str, &T),
{
    fn visit(&mut self, prefix: &str, key: &str, value: &T) {
        self(prefix, key, value)
    }
}

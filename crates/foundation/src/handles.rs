/// Generational handle: `(index, generation)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}

#[cfg(test)]
mod tests {
    use super::Handle;

    #[test]
    fn exposes_index_and_generation() {
        let h = Handle::new(7, 2);
        assert_eq!(h.index(), 7);
        assert_eq!(h.generation(), 2);
        assert_ne!(h, Handle::new(7, 3));
    }
}

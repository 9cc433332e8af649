use rand::Rng;
use rand::rngs::StdRng;

/// Source of the draws a shuffle consumes.
pub trait DrawSource {
    /// Uniform index in `0..=upper`.
    fn index_up_to(&mut self, upper: usize) -> usize;

    fn coin_flip(&mut self) -> bool;
}

impl DrawSource for StdRng {
    fn index_up_to(&mut self, upper: usize) -> usize {
        self.random_range(0..=upper)
    }

    fn coin_flip(&mut self) -> bool {
        self.random_bool(0.5)
    }
}

pub fn fisher_yates<T, R: DrawSource + ?Sized>(items: &mut [T], source: &mut R) {
    for i in (1..items.len()).rev() {
        let j = source.index_up_to(i);
        items.swap(i, j);
    }
}

/// Per-value storage cost used by the capacity-bounded levels.
///
/// The unit is arbitrary; all that matters is that costs are comparable
/// against the level's configured capacity. For byte-oriented values the
/// natural choice is the payload length.
pub trait Cost {
  fn cost(&self) -> u64;
}

impl Cost for String {
  fn cost(&self) -> u64 {
    self.len() as u64
  }
}

impl Cost for Vec<u8> {
  fn cost(&self) -> u64 {
    self.len() as u64
  }
}

impl<T: Cost> Cost for std::sync::Arc<T> {
  fn cost(&self) -> u64 {
    (**self).cost()
  }
}

macro_rules! fixed_cost {
  ($($ty:ty),*) => {
    $(impl Cost for $ty {
      fn cost(&self) -> u64 {
        std::mem::size_of::<$ty>() as u64
      }
    })*
  };
}

fixed_cost!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64, bool);

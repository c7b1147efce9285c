use crate::Float;

/// RGB coefficient spectrum. Radiance, throughput and BSDF values all use this type.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Spectrum([Float; 3]);

impl Spectrum {
    pub const fn rgb(r: Float, g: Float, b: Float) -> Self {
        Self([r, g, b])
    }

    #[inline]
    pub fn new_with<F: FnMut(usize) -> Float>(mut init: F) -> Self {
        Self([init(0), init(1), init(2)])
    }

    #[inline]
    pub fn zip<F: Fn(Float, Float) -> Float>(&self, other: &Self, f: F) -> Self {
        Self::new_with(|i| f(self[i], other[i]))
    }

    pub fn uniform(val: Float) -> Self {
        Self([val; 3])
    }

    pub fn zero() -> Self {
        Self::uniform(0.0)
    }

    pub fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        Self::new_with(|i| f(self[i]))
    }

    /// Exact comparison against zero; an all-zero weight is how scattering
    /// functions report an absorbed sample.
    pub fn is_black(&self) -> bool {
        self.0.iter().all(|&x| x == 0.0)
    }

    pub fn has_nans(&self) -> bool {
        self.0.iter().any(|&x| x.is_nan())
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|&x| x.is_finite())
    }

    pub fn is_non_negative(&self) -> bool {
        self.0.iter().all(|&x| x >= 0.0)
    }

    pub fn max_component_value(&self) -> Float {
        self.0.iter().cloned().fold(Float::NEG_INFINITY, Float::max)
    }

    pub fn average(&self) -> Float {
        (self[0] + self[1] + self[2]) / 3.0
    }

    pub fn luminance(&self) -> Float {
        0.212671 * self[0] + 0.715160 * self[1] + 0.072169 * self[2]
    }

    pub fn sqrt(self) -> Self {
        self.map(Float::sqrt)
    }

    pub fn clamp(self, low: Float, high: Float) -> Self {
        self.map(|x| x.max(low).min(high))
    }

    pub fn clamp_positive(self) -> Self {
        self.clamp(0.0, std::f32::INFINITY)
    }

    pub fn to_rgb(self) -> [Float; 3] {
        self.0
    }
}

impl std::ops::Index<usize> for Spectrum {
    type Output = Float;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl std::ops::IndexMut<usize> for Spectrum {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl std::fmt::Debug for Spectrum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl From<[Float; 3]> for Spectrum {
    fn from(a: [Float; 3]) -> Self {
        Self(a)
    }
}

impl From<Float> for Spectrum {
    fn from(x: Float) -> Self {
        Self::uniform(x)
    }
}

impl From<Spectrum> for [Float; 3] {
    fn from(s: Spectrum) -> Self {
        s.0
    }
}

impl std::iter::Sum for Spectrum {
    fn sum<I: Iterator<Item=Self>>(iter: I) -> Self {
        iter.fold(Self::uniform(0.0), std::ops::Add::add)
    }
}

impl std::ops::Neg for Spectrum {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.map(|x| -x)
    }
}

macro_rules! impl_op {
    ($op:ident, $name:ident, $sym:tt) => {
        impl std::ops::$op for Spectrum {
            type Output = Self;

            fn $name(self, rhs: Self) -> Self::Output {
                Self::zip(&self, &rhs, |x, y| x $sym y)
            }
        }

        impl std::ops::$op<Float> for Spectrum {
            type Output = Self;

            fn $name(self, rhs: Float) -> Self::Output {
                Self::new_with(|i| self[i] $sym rhs)
            }
        }

        impl std::ops::$op<Spectrum> for Float {
            type Output = Spectrum;

            fn $name(self, rhs: Spectrum) -> Self::Output {
                Spectrum::new_with(|i| self $sym rhs[i])
            }
        }
    }
}

macro_rules! impl_assign_op {
    ($op:ident, $name:ident, $sym:tt) => {
        impl std::ops::$op for Spectrum {
            fn $name(&mut self, rhs: Self) {
                for i in 0..3 {
                    self[i] $sym rhs[i];
                }
            }
        }

        impl std::ops::$op<Float> for Spectrum {
            fn $name(&mut self, rhs: Float) {
                for i in 0..3 {
                    self[i] $sym rhs;
                }
            }
        }
    }
}

impl_op!(Add, add, +);
impl_op!(Sub, sub, -);
impl_op!(Mul, mul, *);
impl_op!(Div, div, /);

impl_assign_op!(AddAssign, add_assign, +=);
impl_assign_op!(SubAssign, sub_assign, -=);
impl_assign_op!(MulAssign, mul_assign, *=);
impl_assign_op!(DivAssign, div_assign, /=);

use crate::common::*;

/// Image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HW<T> {
    h: T,
    w: T,
}

impl<T> HW<T> {
    pub fn try_cast<U>(self) -> Option<HW<U>>
    where
        T: ToPrimitive,
        U: NumCast,
    {
        Some(HW {
            h: U::from(self.h)?,
            w: U::from(self.w)?,
        })
    }

    pub fn cast<U>(self) -> HW<U>
    where
        T: ToPrimitive,
        U: NumCast,
    {
        self.try_cast().unwrap()
    }
}

impl<T> HW<T>
where
    T: Num + PartialOrd + Copy,
{
    pub fn try_from_hw(hw: [T; 2]) -> Result<Self> {
        let [h, w] = hw;
        let zero = T::zero();
        ensure!(
            h >= zero && w >= zero,
            "height and width parameters must be non-negative"
        );
        Ok(Self { h, w })
    }

    pub fn from_hw(hw: [T; 2]) -> Self {
        Self::try_from_hw(hw).unwrap()
    }

    pub fn area(&self) -> T {
        self.w * self.h
    }

    /// The shorter side of the two.
    pub fn min_side(&self) -> T {
        if self.h < self.w {
            self.h
        } else {
            self.w
        }
    }

    pub fn w(&self) -> T {
        self.w
    }

    pub fn h(&self) -> T {
        self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn size_area() {
        let s1 = HW::from_hw([3.0, 2.0]);
        let area: f64 = s1.area();
        assert_abs_diff_eq!(area, 6.0);
    }

    #[test]
    fn size_min_side() {
        assert_eq!(HW::from_hw([5usize, 200]).min_side(), 5);
        assert_eq!(HW::from_hw([480usize, 320]).min_side(), 320);
        assert!(HW::try_from_hw([-1.0, 2.0]).is_err());
    }

    #[test]
    fn size_cast() {
        let size: HW<f64> = HW::from_hw([480usize, 640]).cast();
        assert_abs_diff_eq!(size.h(), 480.0);
        assert_abs_diff_eq!(size.w(), 640.0);
    }
}

use auto_ops::impl_op_ex;
use std::iter::Sum;

/// A three-momentum with Cartesian components.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    /// The $`x`$-component.
    pub x: f64,
    /// The $`y`$-component.
    pub y: f64,
    /// The $`z`$-component.
    pub z: f64,
}

impl Vec3 {
    /// Construct a [`Vec3`] from its components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The dot product with another [`Vec3`].
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// The squared magnitude.
    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }

    /// The magnitude.
    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }

    /// Promote to a mass-shell [`Vec4`] with the given invariant mass.
    pub fn with_mass(&self, mass: f64) -> Vec4 {
        let e = (mass * mass + self.mag2()).sqrt();
        self.with_energy(e)
    }

    /// Promote to a [`Vec4`] with the given energy.
    pub fn with_energy(&self, energy: f64) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, energy)
    }
}

impl_op_ex!(+ |a: &Vec3, b: &Vec3| -> Vec3 { Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z) });
impl_op_ex!(-|a: &Vec3, b: &Vec3| -> Vec3 { Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z) });
impl_op_ex!(-|a: &Vec3| -> Vec3 { Vec3::new(-a.x, -a.y, -a.z) });

/// A four-momentum with components $`(p_x, p_y, p_z, E)`$.
///
/// Supports component-wise addition and invariant-mass extraction (the Lorentz-vector
/// contract used to combine muon pairs), along with accessors for the detector coordinates
/// $`(p_T, \eta, \varphi)`$.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    /// The $`x`$-component of the momentum.
    pub x: f64,
    /// The $`y`$-component of the momentum.
    pub y: f64,
    /// The $`z`$-component of the momentum.
    pub z: f64,
    /// The energy component.
    pub t: f64,
}

impl Vec4 {
    /// Construct a [`Vec4`] from Cartesian momentum components and energy.
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self {
            x: px,
            y: py,
            z: pz,
            t: e,
        }
    }

    /// Construct a mass-shell [`Vec4`] from detector coordinates
    /// $`(p_T, \eta, \varphi, m)`$.
    pub fn from_ptetaphim(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        Vec3::new(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh()).with_mass(mass)
    }

    /// The $`x`$-component of the momentum.
    pub fn px(&self) -> f64 {
        self.x
    }

    /// The $`y`$-component of the momentum.
    pub fn py(&self) -> f64 {
        self.y
    }

    /// The $`z`$-component of the momentum.
    pub fn pz(&self) -> f64 {
        self.z
    }

    /// The energy component.
    pub fn e(&self) -> f64 {
        self.t
    }

    /// The momentum part as a [`Vec3`].
    pub fn vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// The transverse momentum.
    pub fn pt(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// The pseudorapidity.
    pub fn eta(&self) -> f64 {
        (self.z / self.pt()).asinh()
    }

    /// The azimuthal angle.
    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// The squared invariant mass.
    pub fn mag2(&self) -> f64 {
        self.t * self.t - self.vec3().mag2()
    }

    /// The invariant mass.
    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }
}

impl_op_ex!(+ |a: &Vec4, b: &Vec4| -> Vec4 { Vec4::new(a.x + b.x, a.y + b.y, a.z + b.z, a.t + b.t) });
impl_op_ex!(-|a: &Vec4, b: &Vec4| -> Vec4 { Vec4::new(a.x - b.x, a.y - b.y, a.z - b.z, a.t - b.t) });
impl_op_ex!(-|a: &Vec4| -> Vec4 { Vec4::new(-a.x, -a.y, -a.z, -a.t) });

impl Sum for Vec4 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Vec4::default(), |acc, p4| acc + p4)
    }
}

//! Sample placement inside a cell.

use std::fmt;

use yee_core::AXES;

/// Bitmask of the axes along which a component's sample sits on the
/// cell's lower face instead of its centre.
///
/// Bit `d` set moves the sample by `-delta[d] / 2` along axis `d`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Stagger(u8);

impl Stagger {
    /// Sample at the cell centre.
    pub const CELL: Stagger = Stagger(0b000);
    /// Sample at the lower corner vertex.
    pub const VERTEX: Stagger = Stagger(0b111);

    /// Stagger from its raw mask. Bits above axis 2 are discarded.
    pub const fn new(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    /// The raw mask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the sample is face-offset along `axis`.
    pub fn bit(self, axis: usize) -> bool {
        self.0 >> axis & 1 == 1
    }

    /// [`bit`](Self::bit) as `0` or `1`.
    pub fn offset(self, axis: usize) -> u32 {
        u32::from(self.0 >> axis & 1)
    }

    /// Stagger of a derivative along `axis` of a field with this stagger.
    pub fn flipped(self, axis: usize) -> Self {
        Self(self.0 ^ (1 << axis))
    }

    /// Per-axis offsets as an array.
    pub fn offsets(self) -> [u32; AXES] {
        [self.offset(0), self.offset(1), self.offset(2)]
    }
}

impl fmt::Display for Stagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#05b}", self.0)
    }
}

/// Named stagger configurations for multi-component fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Component `i` sits on the face normal to axis `i` (magnetic field).
    FaceCentered,
    /// Component `i` sits on the edge parallel to axis `i` (electric field,
    /// current).
    EdgeCentered,
    /// Every component at the cell centre.
    CellCentered,
    /// Every component at the lower vertex.
    VertCentered,
}

impl FieldType {
    /// Stagger of component `comp` (0, 1 or 2).
    pub fn stagger(self, comp: usize) -> Stagger {
        match self {
            FieldType::FaceCentered => Stagger::new(1 << comp),
            FieldType::EdgeCentered => Stagger::new(0b111 ^ (1 << comp)),
            FieldType::CellCentered => Stagger::CELL,
            FieldType::VertCentered => Stagger::VERTEX,
        }
    }

    /// Staggers of the first `N` components.
    pub fn staggers<const N: usize>(self) -> [Stagger; N] {
        std::array::from_fn(|c| self.stagger(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_tables() {
        let bits = |t: FieldType| t.staggers::<3>().map(Stagger::bits);
        assert_eq!(bits(FieldType::FaceCentered), [0b001, 0b010, 0b100]);
        assert_eq!(bits(FieldType::EdgeCentered), [0b110, 0b101, 0b011]);
        assert_eq!(bits(FieldType::CellCentered), [0b000, 0b000, 0b000]);
        assert_eq!(bits(FieldType::VertCentered), [0b111, 0b111, 0b111]);
    }

    #[test]
    fn scalar_fields_take_the_first_entry() {
        assert_eq!(FieldType::VertCentered.staggers::<1>(), [Stagger::VERTEX]);
        assert_eq!(FieldType::EdgeCentered.staggers::<1>(), [Stagger::new(0b110)]);
    }

    #[test]
    fn curl_of_edge_lands_on_face() {
        // z-component of curl E: d/dx E_y - d/dy E_x.
        let edge = FieldType::EdgeCentered;
        assert_eq!(edge.stagger(1).flipped(0), FieldType::FaceCentered.stagger(2));
        assert_eq!(edge.stagger(0).flipped(1), FieldType::FaceCentered.stagger(2));
    }

    #[test]
    fn display_is_binary() {
        assert_eq!(Stagger::new(0b101).to_string(), "0b101");
        assert!(Stagger::new(0b010).bit(1));
        assert!(!Stagger::new(0b010).bit(0));
    }
}

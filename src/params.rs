//! Named, bounded parameter fields.
//!
//! Every unit type publishes a static table of [`Field`]s. A field pairs the
//! compiled-in [`ParamDescriptor`] (name, width, bounds, display precision,
//! optional live-control name) with typed getter and setter functions, so
//! name-based access never touches raw offsets.
//!
//! Reads and writes cross the table as `u32`; the field's own width decides
//! how the value is stored.

use crate::error::ParamError;

/// Storage width of a parameter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    U8,
    U16,
    U32,
}

impl FieldWidth {
    pub const fn bytes(self) -> usize {
        match self {
            FieldWidth::U8 => 1,
            FieldWidth::U16 => 2,
            FieldWidth::U32 => 4,
        }
    }
}

/// Integer types that can back a parameter field.
pub trait FieldValue: Copy {
    const WIDTH: FieldWidth;

    fn to_u32(self) -> u32;

    /// Narrowing conversion. Callers check bounds first, so the value fits.
    fn from_u32(value: u32) -> Self;
}

macro_rules! field_value {
    ($($ty:ty => $width:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const WIDTH: FieldWidth = FieldWidth::$width;

                #[inline]
                fn to_u32(self) -> u32 {
                    u32::from(self)
                }

                #[inline]
                fn from_u32(value: u32) -> Self {
                    value.min(u32::from(<$ty>::MAX)) as $ty
                }
            }
        )*
    };
}

field_value!(u8 => U8, u16 => U16, u32 => U32);

/// Static metadata for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDescriptor {
    /// Accessor name, matched case-insensitively.
    pub name: &'static str,
    pub width: FieldWidth,
    /// Digits shown when the value is displayed.
    pub digits: u8,
    pub min: u32,
    pub max: u32,
    /// Label of the live control that can drive this field, if any.
    pub control: Option<&'static str>,
}

impl ParamDescriptor {
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn check(&self, value: u32) -> Result<u32, ParamError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(ParamError::OutOfRange {
                name: self.name,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A descriptor bound to a field of the parameter block `P`.
pub struct Field<P: 'static> {
    pub descriptor: ParamDescriptor,
    pub(crate) get: fn(&P) -> u32,
    pub(crate) set: fn(&mut P, u32),
}

impl<P> Field<P> {
    pub fn read(&self, block: &P) -> u32 {
        (self.get)(block)
    }

    /// Bounds-checked write. On failure `block` is untouched.
    pub fn write(&self, block: &mut P, value: u32) -> Result<(), ParamError> {
        let value = self.descriptor.check(value)?;
        (self.set)(block, value);
        Ok(())
    }
}

impl<P> std::fmt::Debug for Field<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// A parameter block with a static field table.
pub trait ParamBlock: Sized + 'static {
    fn fields() -> &'static [Field<Self>];

    fn field(name: &str) -> Result<&'static Field<Self>, ParamError> {
        Self::fields()
            .iter()
            .find(|field| field.descriptor.matches(name))
            .ok_or_else(|| ParamError::NotFound(name.to_string()))
    }

    fn get(&self, name: &str) -> Result<u32, ParamError> {
        Ok(Self::field(name)?.read(self))
    }

    fn set(&mut self, name: &str, value: u32) -> Result<(), ParamError> {
        Self::field(name)?.write(self, value)
    }
}

/// Build a [`Field`] for `$block.$path` stored as `$ty`.
///
/// ```ignore
/// field!(VcoParams, "OscType", osc_type: u8, 1, 0, 3),
/// field!(VcoParams, "AmpCtrl", amp_ctrl: u8, 2, 0, 23, control = "VcoAmp"),
/// ```
macro_rules! field {
    (@build $block:ty, $name:literal, $($path:ident).+ : $ty:ty, $digits:expr, $min:expr, $max:expr, $control:expr) => {
        $crate::params::Field::<$block> {
            descriptor: $crate::params::ParamDescriptor {
                name: $name,
                width: <$ty as $crate::params::FieldValue>::WIDTH,
                digits: $digits,
                min: $min,
                max: $max,
                control: $control,
            },
            get: |block: &$block| $crate::params::FieldValue::to_u32(block.$($path).+),
            set: |block: &mut $block, value: u32| {
                block.$($path).+ = <$ty as $crate::params::FieldValue>::from_u32(value)
            },
        }
    };
    ($block:ty, $name:literal, $($path:ident).+ : $ty:ty, $digits:expr, $min:expr, $max:expr) => {
        $crate::params::field!(@build $block, $name, $($path).+ : $ty, $digits, $min, $max, None)
    };
    ($block:ty, $name:literal, $($path:ident).+ : $ty:ty, $digits:expr, $min:expr, $max:expr, control = $control:literal) => {
        $crate::params::field!(@build $block, $name, $($path).+ : $ty, $digits, $min, $max, Some($control))
    };
}

pub(crate) use field;

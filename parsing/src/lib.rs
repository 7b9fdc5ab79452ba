use std::borrow::Cow;

pub use parsing_macro::*;

mod cursor;

pub use cursor::ByteCursor;

pub trait Endianess {}

pub struct LittleEndian;
impl Endianess for LittleEndian {}

pub type LE = LittleEndian;

pub struct BigEndian;
impl Endianess for BigEndian {}

pub type BE = BigEndian;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("buffer underrun at offset {offset:#x}: need {need} bytes, have {have}")]
    BufferUnderrun {
        offset: usize,
        need: usize,
        have: usize,
    },
    #[error("string at offset {offset:#x} is not valid UTF-8: {source}")]
    InvalidString {
        offset: usize,
        source: std::str::Utf8Error,
    },
}

impl Error {
    /// Absolute offset the failing read started at.
    pub fn offset(&self) -> usize {
        match self {
            Error::BufferUnderrun { offset, .. } | Error::InvalidString { offset, .. } => *offset,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ReadBytes<'a> {
    /// Offset of the next read, measured from the start of the underlying buffer.
    fn position(&self) -> usize;
    fn read_bytes(&mut self, num: usize) -> Result<&'a [u8]>;
    fn read_rest(&mut self) -> &'a [u8];
    fn read_type<E: Endianess, T: Parse<'a, E>>(&mut self) -> Result<T>;
    fn read_type_be<T: Parse<'a, BigEndian>>(&mut self) -> Result<T> {
        self.read_type::<BigEndian, T>()
    }
    fn read_type_le<T: Parse<'a, LittleEndian>>(&mut self) -> Result<T> {
        self.read_type::<LittleEndian, T>()
    }

    fn skip(&mut self, num: usize) -> Result<()> {
        self.read_bytes(num).map(|_| ())
    }

    /// Whether [`ReadBytes::read_str`] replaces invalid UTF-8 instead of failing.
    fn lossy_strings(&self) -> bool {
        false
    }

    /// Reads a little-endian `u16` length followed by that many UTF-8 bytes.
    fn read_str(&mut self) -> Result<Cow<'a, str>> {
        let len = self.read_type_le::<u16>()?;
        let offset = self.position();
        let bytes = self.read_bytes(len as usize)?;
        if self.lossy_strings() {
            return Ok(String::from_utf8_lossy(bytes));
        }
        std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|source| Error::InvalidString { offset, source })
    }

    fn read_fixed(&mut self) -> Result<f64> {
        self.read_type_le::<Fixed>().map(Fixed::to_f64)
    }
}

pub trait Parse<'a, E: Endianess>: Sized {
    fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self>;
}

macro_rules! impl_primitive_parse {
    ($typ: ty) => {
        impl<'a> Parse<'a, LittleEndian> for $typ {
            fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
                let bytes = input.read_bytes(std::mem::size_of::<$typ>())?;
                let mut raw = [0_u8; std::mem::size_of::<$typ>()];
                raw.copy_from_slice(bytes);
                Ok(<$typ>::from_le_bytes(raw))
            }
        }

        impl<'a> Parse<'a, BigEndian> for $typ {
            fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
                let bytes = input.read_bytes(std::mem::size_of::<$typ>())?;
                let mut raw = [0_u8; std::mem::size_of::<$typ>()];
                raw.copy_from_slice(bytes);
                Ok(<$typ>::from_be_bytes(raw))
            }
        }

        impl<'a, E: Endianess, const N: usize> Parse<'a, E> for [$typ; N]
        where
            $typ: Parse<'a, E>,
        {
            fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
                let mut out = [Default::default(); N];
                for i in out.iter_mut() {
                    *i = input.read_type::<E, $typ>()?;
                }
                Ok(out)
            }
        }
    };
}

impl_primitive_parse!(u8);
impl_primitive_parse!(u16);
impl_primitive_parse!(u32);
impl_primitive_parse!(u64);

impl_primitive_parse!(i8);
impl_primitive_parse!(i16);
impl_primitive_parse!(i32);
impl_primitive_parse!(i64);

/// Signed 16.16 fixed-point number.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Fixed(pub i32);

impl Fixed {
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / 65536.0
    }
}

impl<'a, E: Endianess> Parse<'a, E> for Fixed
where
    i32: Parse<'a, E>,
{
    fn parse(input: &mut impl ReadBytes<'a>) -> Result<Self> {
        Ok(Fixed(input.read_type::<E, i32>()?))
    }
}

// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Pixel formats and their addressing arithmetic.
//!
//! A format is a zero-sized marker type implementing [`PixelFormat`]. It decides how a pixel is
//! found in the bytes of an image: packed formats address whole bytes, while [`Bitmap`] needs to
//! track a bit within a byte. Iteration only ever goes through these functions so that it never
//! computes strides on its own.
use core::{fmt, mem};

/// The runtime tag of a pixel format, as stored by an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormatKind {
    /// 8-bit red, green, blue and alpha packed into a `u32`.
    Rgb,
    /// 8-bit value and alpha packed into a `u16`.
    Grayscale,
    /// One byte palette index per pixel.
    Indexed,
    /// One bit per pixel.
    Bitmap,
}

impl PixelFormatKind {
    pub const fn bits_per_pixel(self) -> usize {
        match self {
            PixelFormatKind::Rgb => 32,
            PixelFormatKind::Grayscale => 16,
            PixelFormatKind::Indexed => 8,
            PixelFormatKind::Bitmap => 1,
        }
    }

    /// Bytes needed for one row of `width` pixels.
    ///
    /// Rows always start at a byte boundary, so sub-byte formats pad the end of each row. Returns
    /// `None` if the row would not fit into memory.
    pub fn row_stride(self, width: usize) -> Option<usize> {
        let bits = width.checked_mul(self.bits_per_pixel())?;
        Some(bits / 8 + usize::from(bits % 8 != 0))
    }
}

/// Describes the memory layout of one pixel format.
///
/// The iterator of a view holds an `Address` for the current pixel and one for the start of the
/// current row. Moving right uses [`PixelFormat::next_pixel`], moving to the next row of the view
/// uses [`PixelFormat::next_row`] on the row start. All arithmetic is in bytes of the image
/// buffer and `stride` is the byte length of an image row.
pub trait PixelFormat: 'static {
    /// The tag an image of this format carries.
    const KIND: PixelFormatKind;

    /// The value of a single pixel.
    type Pixel: Copy + PartialEq + fmt::Debug;

    /// A position of a pixel within the buffer.
    type Address: Copy + PartialEq + fmt::Debug;

    /// Address of the pixel at column `x` of row `y`.
    fn address_of(stride: usize, x: usize, y: usize) -> Self::Address;

    /// Address of the pixel right of `address`, in the same row.
    fn next_pixel(address: Self::Address) -> Self::Address;

    /// Address of the pixel below `row_start`.
    fn next_row(row_start: Self::Address, stride: usize) -> Self::Address;

    /// Read the pixel at `address`.
    ///
    /// # Panics
    ///
    /// When the address lies outside of `bytes`.
    fn get(bytes: &[u8], address: Self::Address) -> Self::Pixel;

    /// Overwrite the pixel at `address`.
    ///
    /// # Panics
    ///
    /// When the address lies outside of `bytes`.
    fn put(bytes: &mut [u8], address: Self::Address, pixel: Self::Pixel);
}

macro_rules! packed_format {
    ($(#[$attr:meta])* $name:ident = $kind:ident($pixel:ty)) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl PixelFormat for $name {
            const KIND: PixelFormatKind = PixelFormatKind::$kind;
            type Pixel = $pixel;
            type Address = usize;

            fn address_of(stride: usize, x: usize, y: usize) -> usize {
                y * stride + x * mem::size_of::<$pixel>()
            }

            fn next_pixel(address: usize) -> usize {
                address + mem::size_of::<$pixel>()
            }

            fn next_row(row_start: usize, stride: usize) -> usize {
                row_start + stride
            }

            fn get(bytes: &[u8], address: usize) -> $pixel {
                let end = address + mem::size_of::<$pixel>();
                bytemuck::pod_read_unaligned(&bytes[address..end])
            }

            fn put(bytes: &mut [u8], address: usize, pixel: $pixel) {
                let end = address + mem::size_of::<$pixel>();
                bytes[address..end].copy_from_slice(bytemuck::bytes_of(&pixel));
            }
        }
    };
}

packed_format! {
    /// Packed 32-bit color, see [`rgba`].
    Rgba = Rgb(u32)
}

packed_format! {
    /// Packed 16-bit value with alpha, see [`graya`].
    Grayscale = Grayscale(u16)
}

packed_format! {
    /// 8-bit indices into a palette.
    Indexed = Indexed(u8)
}

/// Single bits, the least significant bit of each byte is the left-most pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bitmap;

/// Position of a single bit in a buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitAddress {
    pub byte: usize,
    /// Bit within the byte, always below 8.
    pub bit: u8,
}

impl PixelFormat for Bitmap {
    const KIND: PixelFormatKind = PixelFormatKind::Bitmap;
    type Pixel = bool;
    type Address = BitAddress;

    fn address_of(stride: usize, x: usize, y: usize) -> BitAddress {
        BitAddress {
            byte: y * stride + x / 8,
            // Remainder is below 8.
            bit: (x % 8) as u8,
        }
    }

    fn next_pixel(address: BitAddress) -> BitAddress {
        if address.bit == 7 {
            BitAddress {
                byte: address.byte + 1,
                bit: 0,
            }
        } else {
            BitAddress {
                bit: address.bit + 1,
                ..address
            }
        }
    }

    fn next_row(row_start: BitAddress, stride: usize) -> BitAddress {
        BitAddress {
            byte: row_start.byte + stride,
            ..row_start
        }
    }

    fn get(bytes: &[u8], address: BitAddress) -> bool {
        bytes[address.byte] & (1 << address.bit) != 0
    }

    fn put(bytes: &mut [u8], address: BitAddress, pixel: bool) {
        let mask = 1 << address.bit;
        if pixel {
            bytes[address.byte] |= mask;
        } else {
            bytes[address.byte] &= !mask;
        }
    }
}

/// Pack an [`Rgba`] pixel.
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24
}

pub const fn rgba_r(pixel: u32) -> u8 {
    pixel as u8
}

pub const fn rgba_g(pixel: u32) -> u8 {
    (pixel >> 8) as u8
}

pub const fn rgba_b(pixel: u32) -> u8 {
    (pixel >> 16) as u8
}

pub const fn rgba_a(pixel: u32) -> u8 {
    (pixel >> 24) as u8
}

/// Pack a [`Grayscale`] pixel.
pub const fn graya(v: u8, a: u8) -> u16 {
    (v as u16) | (a as u16) << 8
}

pub const fn graya_v(pixel: u16) -> u8 {
    pixel as u8
}

pub const fn graya_a(pixel: u16) -> u8 {
    (pixel >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_strides() {
        assert_eq!(PixelFormatKind::Rgb.row_stride(3), Some(12));
        assert_eq!(PixelFormatKind::Grayscale.row_stride(3), Some(6));
        assert_eq!(PixelFormatKind::Indexed.row_stride(3), Some(3));
        assert_eq!(PixelFormatKind::Bitmap.row_stride(8), Some(1));
        assert_eq!(PixelFormatKind::Bitmap.row_stride(9), Some(2));
        assert_eq!(PixelFormatKind::Bitmap.row_stride(0), Some(0));
        assert_eq!(PixelFormatKind::Rgb.row_stride(usize::MAX), None);
    }

    #[test]
    fn bit_addresses_carry_into_next_byte() {
        let start = Bitmap::address_of(2, 6, 1);
        assert_eq!(start, BitAddress { byte: 2, bit: 6 });

        let next = Bitmap::next_pixel(start);
        assert_eq!(next, BitAddress { byte: 2, bit: 7 });
        assert_eq!(Bitmap::next_pixel(next), BitAddress { byte: 3, bit: 0 });
        assert_eq!(Bitmap::next_row(start, 2), Bitmap::address_of(2, 6, 2));
    }

    #[test]
    fn bits_are_independent() {
        let mut bytes = [0u8; 2];
        Bitmap::put(&mut bytes, BitAddress { byte: 1, bit: 3 }, true);
        Bitmap::put(&mut bytes, BitAddress { byte: 0, bit: 0 }, true);
        assert_eq!(bytes, [0b0000_0001, 0b0000_1000]);

        Bitmap::put(&mut bytes, BitAddress { byte: 0, bit: 0 }, false);
        assert_eq!(bytes, [0, 0b0000_1000]);
        assert!(Bitmap::get(&bytes, BitAddress { byte: 1, bit: 3 }));
        assert!(!Bitmap::get(&bytes, BitAddress { byte: 1, bit: 2 }));
    }

    #[test]
    fn packed_pixels() {
        let mut bytes = [0u8; 12];
        let address = Rgba::address_of(12, 1, 0);
        assert_eq!(address, 4);

        let red = rgba(0xff, 0x10, 0x20, 0x80);
        Rgba::put(&mut bytes, address, red);
        assert_eq!(Rgba::get(&bytes, address), red);
        assert_eq!(Rgba::get(&bytes, Rgba::next_pixel(address)), 0);

        assert_eq!(
            (rgba_r(red), rgba_g(red), rgba_b(red), rgba_a(red)),
            (0xff, 0x10, 0x20, 0x80)
        );
        assert_eq!(graya_v(graya(7, 9)), 7);
        assert_eq!(graya_a(graya(7, 9)), 9);
        assert_eq!(Grayscale::next_pixel(Grayscale::address_of(6, 2, 1)), 6 + 6);
    }
}

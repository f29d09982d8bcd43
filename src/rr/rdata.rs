// Copyright 2025 the arbor developers.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the [`Rdata`] type and DNS RDATA processing.

use std::fmt::{self, Write};
use std::net::{Ipv4Addr, Ipv6Addr};

use super::{Error, Type};
use crate::buf::{self, WireReader, WireWriter};
use crate::name::Name;
use crate::util::nibble_to_ascii_hex_digit;

////////////////////////////////////////////////////////////////////////
// RDATA TYPE                                                         //
////////////////////////////////////////////////////////////////////////

/// The type-specific payload of a resource record.
///
/// The variants cover the RR types this server answers with: A
/// ([RFC 1035 § 3.4.1]), AAAA ([RFC 3596]), MX, CNAME, NS, PTR, SOA,
/// and TXT (all [RFC 1035 § 3.3]). RDATA of any other recognized type
/// is preserved as an opaque octet string in [`Rdata::Unknown`], so
/// such records survive a decode/encode round trip bit-for-bit.
///
/// [RFC 1035 § 3.3]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.3
/// [RFC 1035 § 3.4.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.4.1
/// [RFC 3596]: https://datatracker.ietf.org/doc/html/rfc3596
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rdata {
    A([u8; 4]),
    Aaaa([u8; 16]),
    Cname(Name),
    Mx {
        preference: u16,
        exchanger: Name,
    },
    Ns(Name),
    Ptr(Name),
    Soa {
        mname: Name,
        rname: Name,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Txt(Box<[u8]>),
    Unknown {
        rr_type: Type,
        octets: Box<[u8]>,
    },
}

impl Rdata {
    /// Constructs A RDATA from an IPv4 address.
    pub fn a(address: Ipv4Addr) -> Self {
        Self::A(address.octets())
    }

    /// Constructs AAAA RDATA from an IPv6 address.
    pub fn aaaa(address: Ipv6Addr) -> Self {
        Self::Aaaa(address.octets())
    }

    /// Returns the RR type this RDATA belongs to.
    pub fn rr_type(&self) -> Type {
        match self {
            Self::A(_) => Type::A,
            Self::Aaaa(_) => Type::AAAA,
            Self::Cname(_) => Type::CNAME,
            Self::Mx { .. } => Type::MX,
            Self::Ns(_) => Type::NS,
            Self::Ptr(_) => Type::PTR,
            Self::Soa { .. } => Type::SOA,
            Self::Txt(_) => Type::TXT,
            Self::Unknown { rr_type, .. } => *rr_type,
        }
    }

    /// Reads RDATA of type `rr_type` and length `rdlength` starting at
    /// `&message[cursor]`.
    ///
    /// The entire message is passed (rather than just the RDATA) so
    /// that embedded domain names may be decompressed: per
    /// [RFC 3597 § 4], names in the RDATA of the [RFC 1035] types may
    /// be compressed relative to the enclosing message.
    ///
    /// If the remaining part of the message is shorter than
    /// `rdlength`, this fails with [`Error::UnexpectedEom`] rather
    /// than panic, so it's okay to call this without validating
    /// `rdlength` first.
    ///
    /// [RFC 1035]: https://datatracker.ietf.org/doc/html/rfc1035
    /// [RFC 3597 § 4]: https://datatracker.ietf.org/doc/html/rfc3597#section-4
    pub fn decode(
        rr_type: Type,
        message: &[u8],
        cursor: usize,
        rdlength: u16,
    ) -> Result<Self, Error> {
        let rdlength = rdlength as usize;
        if cursor + rdlength > message.len() {
            return Err(Error::UnexpectedEom);
        }
        let octets = &message[cursor..cursor + rdlength];

        match rr_type {
            Type::A => {
                if rdlength != 4 {
                    Err(Error::InvalidARecord)
                } else {
                    Ok(Self::A(octets.try_into().unwrap()))
                }
            }
            Type::AAAA => {
                if rdlength != 16 {
                    Err(Error::InvalidAAAARecord)
                } else {
                    Ok(Self::Aaaa(octets.try_into().unwrap()))
                }
            }
            Type::CNAME => Self::decode_name_rdata(message, cursor, rdlength).map(Self::Cname),
            Type::NS => Self::decode_name_rdata(message, cursor, rdlength).map(Self::Ns),
            Type::PTR => Self::decode_name_rdata(message, cursor, rdlength).map(Self::Ptr),
            Type::MX => {
                if rdlength < 3 {
                    return Err(Error::InvalidMXRecord);
                }
                let mut reader = WireReader::new(octets);
                let preference = reader.take_u16()?;
                let (exchanger, len) = Name::try_from_compressed(message, cursor + 2)?;
                if 2 + len != rdlength {
                    Err(Error::InvalidMXRecord)
                } else {
                    Ok(Self::Mx {
                        preference,
                        exchanger,
                    })
                }
            }
            Type::SOA => {
                let (mname, mname_len) = Name::try_from_compressed(message, cursor)?;
                let (rname, rname_len) = Name::try_from_compressed(message, cursor + mname_len)?;
                if mname_len + rname_len + 20 != rdlength {
                    return Err(Error::RdlengthMismatch);
                }
                let mut reader = WireReader::new(octets);
                reader.skip(mname_len + rname_len)?;
                Ok(Self::Soa {
                    mname,
                    rname,
                    serial: reader.take_u32()?,
                    refresh: reader.take_u32()?,
                    retry: reader.take_u32()?,
                    expire: reader.take_u32()?,
                    minimum: reader.take_u32()?,
                })
            }
            Type::TXT => Ok(Self::Txt(octets.into())),
            _ => Ok(Self::Unknown {
                rr_type,
                octets: octets.into(),
            }),
        }
    }

    /// Decodes RDATA consisting of a single (possibly compressed)
    /// domain name.
    fn decode_name_rdata(message: &[u8], cursor: usize, rdlength: usize) -> Result<Name, Error> {
        let (name, len) = Name::try_from_compressed(message, cursor)?;
        if len != rdlength {
            Err(Error::RdlengthMismatch)
        } else {
            Ok(name)
        }
    }

    /// Writes the RDATA payload (without the RDLENGTH field) to `out`.
    /// Embedded domain names are written uncompressed.
    pub fn encode(&self, out: &mut WireWriter) -> Result<(), buf::Error> {
        match self {
            Self::A(octets) => out.write(octets),
            Self::Aaaa(octets) => out.write(octets),
            Self::Cname(name) | Self::Ns(name) | Self::Ptr(name) => name.encode(out),
            Self::Mx {
                preference,
                exchanger,
            } => {
                out.write_u16(*preference)?;
                exchanger.encode(out)
            }
            Self::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => {
                mname.encode(out)?;
                rname.encode(out)?;
                out.write_u32(*serial)?;
                out.write_u32(*refresh)?;
                out.write_u32(*retry)?;
                out.write_u32(*expire)?;
                out.write_u32(*minimum)
            }
            Self::Txt(octets) => out.write(octets),
            Self::Unknown { octets, .. } => out.write(octets),
        }
    }
}

/// RDATA is displayed in the conventional presentation format of its
/// type; TXT and unknown RDATA use the [RFC 3597 § 5] generic `\#`
/// form.
///
/// [RFC 3597 § 5]: https://datatracker.ietf.org/doc/html/rfc3597#section-5
impl fmt::Display for Rdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::A(octets) => Ipv4Addr::from(*octets).fmt(f),
            Self::Aaaa(octets) => Ipv6Addr::from(*octets).fmt(f),
            Self::Cname(name) | Self::Ns(name) | Self::Ptr(name) => name.fmt(f),
            Self::Mx {
                preference,
                exchanger,
            } => write!(f, "{} {}", preference, exchanger),
            Self::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "{} {} {} {} {} {} {}",
                mname, rname, serial, refresh, retry, expire, minimum
            ),
            Self::Txt(octets) | Self::Unknown { octets, .. } => {
                write!(f, "\\# {}", octets.len())?;
                if !octets.is_empty() {
                    f.write_char(' ')?;
                    for octet in octets.iter() {
                        f.write_char(char::from(nibble_to_ascii_hex_digit((octet & 0xf0) >> 4)))?;
                        f.write_char(char::from(nibble_to_ascii_hex_digit(octet & 0xf)))?;
                    }
                }
                Ok(())
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

//! Page segmentation
//!
//! A plane is cut into 61 pages; every page travels as five sub-frames.
//! The last page holds only 120 bytes and is zero-padded to the standard
//! page size so it splits like any other, but its checksum covers the
//! 120 meaningful bytes only.

use heapless::Vec;
use inklink_protocol::crc;

use crate::image::{Plane, PLANE_SIZE};

/// Pages per plane
pub const PAGES_PER_PLANE: u8 = 61;

/// Meaningful bytes in pages 1..=60
pub const DATA_PER_PAGE: usize = 248;

/// Meaningful bytes in page 61
pub const LAST_PAGE_DATA_SIZE: usize = 120;

/// Sub-frames per page
pub const SUBFRAMES_PER_PAGE: u8 = 5;

/// Data bytes in sub-frames 1..=4
pub const FRAME_DATA_SIZE: usize = 54;

/// Data bytes in sub-frame 5, before the page checksum
pub const LAST_DATA_SIZE: usize = 32;

/// Little-endian page checksum appended to sub-frame 5
pub const CHECKSUM_SIZE: usize = 4;

/// Largest sub-frame payload
pub const MAX_SUBFRAME_PAYLOAD: usize = FRAME_DATA_SIZE;

const _: () =
    assert!((PAGES_PER_PLANE as usize - 1) * DATA_PER_PAGE + LAST_PAGE_DATA_SIZE == PLANE_SIZE);
const _: () = assert!(
    (SUBFRAMES_PER_PAGE as usize - 1) * FRAME_DATA_SIZE + LAST_DATA_SIZE == DATA_PER_PAGE
);
const _: () = assert!(LAST_DATA_SIZE + CHECKSUM_SIZE <= MAX_SUBFRAME_PAYLOAD);

/// Meaningful byte count of a page number
pub const fn meaningful_len(number: u8) -> usize {
    if number == PAGES_PER_PLANE {
        LAST_PAGE_DATA_SIZE
    } else {
        DATA_PER_PAGE
    }
}

/// One page of plane data, padded to [`DATA_PER_PAGE`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    number: u8,
    data: [u8; DATA_PER_PAGE],
    len: usize,
}

impl Page {
    /// Page number, 1-based
    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_last(&self) -> bool {
        self.number == PAGES_PER_PLANE
    }

    /// Plane bytes carried by this page, without padding
    pub fn meaningful(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Page bytes including zero padding
    pub fn padded(&self) -> &[u8; DATA_PER_PAGE] {
        &self.data
    }

    /// CRC-32 over the meaningful bytes
    pub fn checksum(&self) -> u32 {
        crc::checksum(self.meaningful())
    }

    /// The five sub-frames of this page, in order
    pub fn subframes(&self) -> SubFrames<'_> {
        SubFrames {
            page: self,
            checksum: self.checksum(),
            next: 1,
        }
    }
}

/// Cut page `number` (1..=61) out of `plane`
pub fn page(plane: Plane<'_>, number: u8) -> Option<Page> {
    if !(1..=PAGES_PER_PLANE).contains(&number) {
        return None;
    }

    let start = usize::from(number - 1) * DATA_PER_PAGE;
    let len = meaningful_len(number);
    let mut data = [0u8; DATA_PER_PAGE];
    data[..len].copy_from_slice(&plane.as_bytes()[start..start + len]);

    Some(Page { number, data, len })
}

/// All pages of `plane`, in transfer order
pub fn pages(plane: Plane<'_>) -> impl Iterator<Item = Page> + '_ {
    (1..=PAGES_PER_PLANE).filter_map(move |number| page(plane, number))
}

/// One physical frame's worth of page data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubFrame {
    number: u8,
    payload: Vec<u8, MAX_SUBFRAME_PAYLOAD>,
    data_len: usize,
}

impl SubFrame {
    /// Sub-frame number, 1-based
    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_last(&self) -> bool {
        self.number == SUBFRAMES_PER_PAGE
    }

    /// Bytes placed in the data frame
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Page data only, without the trailing checksum of sub-frame 5
    pub fn data(&self) -> &[u8] {
        &self.payload[..self.data_len]
    }
}

/// Iterator over the sub-frames of a page
#[derive(Debug, Clone)]
pub struct SubFrames<'a> {
    page: &'a Page,
    checksum: u32,
    next: u8,
}

impl Iterator for SubFrames<'_> {
    type Item = SubFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > SUBFRAMES_PER_PAGE {
            return None;
        }
        let number = self.next;
        self.next += 1;

        let start = usize::from(number - 1) * FRAME_DATA_SIZE;
        let data_len = if number == SUBFRAMES_PER_PAGE {
            LAST_DATA_SIZE
        } else {
            FRAME_DATA_SIZE
        };

        let mut payload = Vec::new();
        payload
            .extend_from_slice(&self.page.data[start..start + data_len])
            .ok()?;
        if number == SUBFRAMES_PER_PAGE {
            payload
                .extend_from_slice(&self.checksum.to_le_bytes())
                .ok()?;
        }

        Some(SubFrame {
            number,
            payload,
            data_len,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from((SUBFRAMES_PER_PAGE + 1).saturating_sub(self.next));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SubFrames<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use proptest::prelude::*;

    fn reassemble(plane: Plane<'_>) -> std::vec::Vec<u8> {
        let mut out = std::vec::Vec::new();
        for page in pages(plane) {
            let mut page_bytes = std::vec::Vec::new();
            for sub in page.subframes() {
                page_bytes.extend_from_slice(sub.data());
            }
            assert_eq!(page_bytes.len(), DATA_PER_PAGE);
            out.extend_from_slice(&page_bytes[..meaningful_len(page.number())]);
        }
        out
    }

    #[test]
    fn test_sixty_one_pages_in_order() {
        let bytes = Pattern::Ramp.render();
        let numbers: std::vec::Vec<u8> = pages(Plane::from_array(&bytes))
            .map(|p| p.number())
            .collect();
        assert_eq!(numbers, (1..=61).collect::<std::vec::Vec<u8>>());
    }

    #[test]
    fn test_page_sizes() {
        let bytes = [0xAAu8; PLANE_SIZE];
        for page in pages(Plane::from_array(&bytes)) {
            if page.number() == 61 {
                assert_eq!(page.meaningful().len(), 120);
                assert!(page.is_last());
            } else {
                assert_eq!(page.meaningful().len(), 248);
            }
        }
    }

    #[test]
    fn test_last_page_zero_padded() {
        let bytes = [0xFFu8; PLANE_SIZE];
        let last = page(Plane::from_array(&bytes), 61).unwrap();
        assert!(last.padded()[..120].iter().all(|&b| b == 0xFF));
        assert!(last.padded()[120..].iter().all(|&b| b == 0x00));
    }

    #[test]
    fn test_out_of_range_pages() {
        let bytes = [0u8; PLANE_SIZE];
        let plane = Plane::from_array(&bytes);
        assert!(page(plane, 0).is_none());
        assert!(page(plane, 62).is_none());
    }

    #[test]
    fn test_subframe_sizes() {
        let bytes = Pattern::Stripes.render();
        let page = page(Plane::from_array(&bytes), 7).unwrap();
        let subs: std::vec::Vec<SubFrame> = page.subframes().collect();

        assert_eq!(subs.len(), 5);
        for sub in &subs[..4] {
            assert_eq!(sub.payload().len(), 54);
            assert_eq!(sub.data().len(), 54);
        }
        assert_eq!(subs[4].data().len(), 32);
        assert_eq!(subs[4].payload().len(), 36);
        assert!(subs[4].is_last());
        assert_eq!(
            subs.iter().map(SubFrame::number).collect::<std::vec::Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn test_checksum_trails_last_subframe() {
        let bytes = Pattern::Ramp.render();
        let plane = Plane::from_array(&bytes);
        let page = page(plane, 2).unwrap();
        let last = page.subframes().last().unwrap();

        let expected = crc::checksum(&bytes[248..496]);
        assert_eq!(page.checksum(), expected);
        assert_eq!(&last.payload()[32..], &expected.to_le_bytes());
    }

    #[test]
    fn test_last_page_checksum_ignores_padding() {
        let bytes = Pattern::Ramp.render();
        let last = page(Plane::from_array(&bytes), 61).unwrap();
        assert_eq!(last.checksum(), crc::checksum(&bytes[PLANE_SIZE - 120..]));
        assert_ne!(last.checksum(), crc::checksum(last.padded()));
    }

    #[test]
    fn test_subframes_exact_size() {
        let bytes = [0u8; PLANE_SIZE];
        let page = page(Plane::from_array(&bytes), 1).unwrap();
        let mut subs = page.subframes();
        assert_eq!(subs.len(), 5);
        subs.next();
        assert_eq!(subs.len(), 4);
    }

    #[test]
    fn test_reassembly_of_ramp() {
        let bytes = Pattern::Ramp.render();
        assert_eq!(reassemble(Plane::from_array(&bytes)), bytes.to_vec());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_reassembly_reproduces_plane(
            bytes in proptest::collection::vec(any::<u8>(), PLANE_SIZE)
        ) {
            let plane = Plane::new(&bytes).unwrap();
            prop_assert_eq!(reassemble(plane), bytes);
        }
    }
}

//! Comment record.

use super::RecordBody;
use crate::common::binary::BinaryCursor;
use crate::common::error::Result;
use crate::images::emfplus::header::{RecordFrame, SizeRule};
use serde::Serialize;

/// Application-private data; its layout is not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    pub private_data: Vec<u8>,
}

pub(super) fn decode(frame: &RecordFrame, cursor: &mut BinaryCursor<'_>) -> Result<RecordBody> {
    frame.decode_payload(cursor, SizeRule::Variable, |payload| {
        Ok(RecordBody::Comment(CommentRecord {
            private_data: payload.read_bytes(payload.remaining())?.to_vec(),
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::images::emfplus::header::RecordType;
    use crate::images::emfplus::records::decode_record;
    use crate::images::emfplus::test_support::{record, record_with_sizes};

    #[test]
    fn test_comment_with_private_data() {
        let data = record(0x4003, 0, b"EMF+DATA");
        assert_eq!(&data[4..12], &[0x14, 0, 0, 0, 0x08, 0, 0, 0]);
        let record = decode_record(&mut BinaryCursor::new(&data)).unwrap();
        assert_eq!(
            record.body,
            RecordBody::Comment(CommentRecord {
                private_data: b"EMF+DATA".to_vec()
            })
        );
    }

    #[test]
    fn test_unaligned_data_size() {
        let data = record_with_sizes(0x4003, 0, 0x12, 0x06, &[0; 6]);
        assert!(matches!(
            decode_record(&mut BinaryCursor::new(&data)),
            Err(Error::SizeInvariantViolation {
                record: RecordType::Comment,
                ..
            })
        ));
    }
}

use copyrnn::data::{ExtendedVocabBatch, SequenceBatch};
use copyrnn::error::ModelError;

#[test]
fn from_rows_pads_and_derives_mask() {
    let batch = SequenceBatch::from_rows(&[vec![3, 4], vec![5, 6, 7]], 4, 0).unwrap();
    assert_eq!(batch.batch_size(), 2);
    assert_eq!(batch.token(0, 0), 3);
    assert_eq!(batch.token(0, 2), 0);
    assert_eq!(batch.len_of(1), 3);
    assert_eq!(
        batch.padding_mask(),
        vec![false, false, true, true, false, false, false, true]
    );
}

#[test]
fn pad_inside_true_length_is_rejected() {
    // PAD at position 1 of a length-3 row violates the mask invariant.
    let err = SequenceBatch::new(vec![3, 0, 4, 0], vec![3], 4, 0).unwrap_err();
    assert!(matches!(
        err,
        ModelError::PaddingMaskViolation { row: 0, pos: 1 }
    ));
}

#[test]
fn zero_and_oversized_lengths_are_rejected() {
    let err = SequenceBatch::new(vec![0, 0], vec![0], 2, 0).unwrap_err();
    assert!(matches!(err, ModelError::LengthOutOfRange { len: 0, .. }));

    let err = SequenceBatch::from_rows(&[vec![1, 2, 3]], 2, 0).unwrap_err();
    assert!(matches!(err, ModelError::LengthOutOfRange { len: 3, max: 2 }));
}

#[test]
fn extended_ids_must_stay_below_vocab_plus_oov() {
    let src = SequenceBatch::from_rows(&[vec![1, 2]], 2, 0).unwrap();
    let err = ExtendedVocabBatch::new(vec![1, 7], vec![1], &src, 5, 2).unwrap_err();
    assert!(matches!(err, ModelError::OovIdOutOfRange { id: 7, limit: 7 }));

    let ok = ExtendedVocabBatch::new(vec![1, 6], vec![1], &src, 5, 2).unwrap();
    assert_eq!(ok.id(0, 1), 6);
    assert_eq!(ok.oov_count(0), 1);
}

#[test]
fn oov_count_above_maximum_is_rejected() {
    let src = SequenceBatch::from_rows(&[vec![1, 2]], 2, 0).unwrap();
    let err = ExtendedVocabBatch::new(vec![1, 2], vec![3], &src, 5, 2).unwrap_err();
    assert!(matches!(err, ModelError::OovCountOutOfRange { count: 3, max: 2 }));
}

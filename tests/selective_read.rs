use copyrnn::config::{CopyRnnConfig, ScoreMode};
use copyrnn::data::SequenceBatch;
use copyrnn::models::CopyRnn;

fn model() -> CopyRnn {
    CopyRnn::new(CopyRnnConfig {
        vocab_size: 10,
        embed_size: 3,
        src_hidden_size: 4,
        target_hidden_size: 4,
        max_src_len: 4,
        max_oov_count: 2,
        dropout: 0.0,
        score_mode: ScoreMode::General,
        pad_id: 0,
    })
    .unwrap()
}

#[test]
fn single_match_concentrates_all_weight_on_that_position() {
    let m = model();
    let src = SequenceBatch::from_rows(&[vec![5, 6, 7]], 4, 0).unwrap();
    let (enc, state) = m.start_sequence(&src).unwrap();
    // Token 6 occurs only at position 1, so after masking non-matches the
    // copy state must equal the encoder state at position 1 exactly.
    let copy_state = m
        .decoder
        .selective_read
        .read(&[6], &src, &enc, &state.prev_context, m.device());
    for d in 0..4 {
        assert!((copy_state.get(0, d) - enc.outputs.get(&[0, 1, d])).abs() < 1e-6);
    }
}

#[test]
fn no_match_row_stays_finite() {
    let m = model();
    let src = SequenceBatch::from_rows(&[vec![5, 6, 7]], 4, 0).unwrap();
    let (enc, state) = m.start_sequence(&src).unwrap();
    // Token 9 never occurs in the source; the guard must keep the softmax
    // away from the all-masked case.
    let copy_state = m
        .decoder
        .selective_read
        .read(&[9], &src, &enc, &state.prev_context, m.device());
    for d in 0..4 {
        assert!(copy_state.get(0, d).is_finite());
    }
}

#[test]
fn mixed_batch_guards_only_matchless_rows() {
    let m = model();
    let src = SequenceBatch::from_rows(&[vec![5, 6, 7], vec![5, 6, 7]], 4, 0).unwrap();
    let (enc, state) = m.start_sequence(&src).unwrap();
    // Row 0 matches at position 2, row 1 matches nowhere.
    let copy_state = m
        .decoder
        .selective_read
        .read(&[7, 9], &src, &enc, &state.prev_context, m.device());
    for d in 0..4 {
        assert!((copy_state.get(0, d) - enc.outputs.get(&[0, 2, d])).abs() < 1e-6);
        assert!(copy_state.get(1, d).is_finite());
    }
}

use byteorder::{BigEndian, WriteBytesExt};
use crossword_reader::crossword::codec::{puzzle_io, state_io, wire};
use crossword_reader::crossword::{Cell, CrosswordBuilder, CrosswordError, Direction, ProgressState, WordBuilder};
use crossword_reader::Crossword;
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn sample() -> Crossword {
    let mut builder = CrosswordBuilder::new();
    builder
        .set_width(2)
        .set_height(2)
        .set_title("Test".to_string())
        .set_author("Tester".to_string())
        .set_date(1_700_000_000_000)
        .set_alphabet("ABCDEFGHIJKLMNOPQRSTUVWXYZ".chars());
    let mut across = WordBuilder::new(Direction::Across).number(1).hint("OK").start(0, 0);
    across.add_cell("O", 0);
    across.add_cell("K", Cell::ATTR_CIRCLED);
    builder.add_word(across.build().unwrap());
    builder.add_word(
        WordBuilder::new(Direction::Down)
            .number(1)
            .hint("Oh")
            .start(0, 0)
            .hint_url("https://example.com/oh")
            .answer("OH")
            .build()
            .unwrap(),
    );
    let mut rebus = WordBuilder::new(Direction::Down).number(2).hint("Unknown").start(0, 1);
    rebus.add_cell("K", 0);
    rebus.add_cell("", Cell::ATTR_NO_SOLUTION);
    builder.add_word(rebus.build().unwrap());
    builder.build().unwrap()
}

fn encode(crossword: &Crossword) -> Vec<u8> {
    let mut buffer = Vec::new();
    puzzle_io::write_crossword(&mut buffer, crossword).unwrap();
    buffer
}

#[test]
fn crossword_survives_round_trip() {
    let original = sample();
    let buffer = encode(&original);
    let decoded = puzzle_io::read_crossword(&mut Cursor::new(&buffer)).unwrap();

    assert_eq!(decoded.hash(), original.hash());
    assert_eq!(decoded.title(), Some("Test"));
    assert_eq!(decoded.author(), Some("Tester"));
    assert_eq!(decoded.description(), None);
    assert_eq!(decoded.date(), 1_700_000_000_000);
    assert_eq!(decoded.square_count(), original.square_count());
    assert_eq!(decoded.alphabet(), original.alphabet());

    let word = decoded.find_word(Direction::Across, 1).unwrap();
    assert_eq!(word.hint(), Some("OK"));
    assert!(word.cell_at(1).unwrap().is_circled());
    let down = decoded.find_word(Direction::Down, 1).unwrap();
    assert_eq!(down.hint_url(), Some("https://example.com/oh"));
    assert!(decoded.cell_at(1, 1).unwrap().has_no_solution());
}

#[test]
fn crossword_rejects_bad_magic() {
    let mut buffer = encode(&sample());
    buffer[0] ^= 0xff;
    assert!(matches!(
        puzzle_io::read_crossword(&mut Cursor::new(&buffer)),
        Err(CrosswordError::Format(_))
    ));
}

#[test]
fn crossword_rejects_other_versions() {
    let mut buffer = encode(&sample());
    buffer[4] = puzzle_io::VERSION_CURRENT - 1;
    assert!(matches!(
        puzzle_io::read_crossword(&mut Cursor::new(&buffer)),
        Err(CrosswordError::Format(_))
    ));
}

#[test]
fn crossword_reports_truncation() {
    let buffer = encode(&sample());
    let short = &buffer[..buffer.len() - 3];
    assert!(matches!(
        puzzle_io::read_crossword(&mut Cursor::new(short)),
        Err(CrosswordError::Truncated(_))
    ));
}

/// Word record as (number, start row, start column, answer).
type RawWord<'a> = (u32, u32, u32, &'a str);

/// Hand-assembles a crossword stream, bypassing the builder.
fn raw_stream(width: u32, height: u32, squares: u32, across: &[RawWord], down: &[RawWord]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(puzzle_io::MAGIC_NUMBER).unwrap();
    out.write_u8(puzzle_io::VERSION_CURRENT).unwrap();
    out.write_u32::<BigEndian>(width).unwrap();
    out.write_u32::<BigEndian>(height).unwrap();
    out.write_u32::<BigEndian>(squares).unwrap();
    for _ in 0..5 {
        wire::write_opt_string(&mut out, None).unwrap();
    }
    wire::write_chars(&mut out, std::iter::empty::<char>()).unwrap();
    out.write_i64::<BigEndian>(0).unwrap();
    out.write_u32::<BigEndian>(0).unwrap();
    for words in [across, down] {
        out.write_u32::<BigEndian>(words.len() as u32).unwrap();
        for &(number, row, column, answer) in words {
            out.write_u32::<BigEndian>(number).unwrap();
            wire::write_opt_string(&mut out, Some("clue")).unwrap();
            out.write_u32::<BigEndian>(row).unwrap();
            out.write_u32::<BigEndian>(column).unwrap();
            wire::write_opt_string(&mut out, None).unwrap();
            wire::write_opt_string(&mut out, None).unwrap();
            out.write_u32::<BigEndian>(answer.chars().count() as u32).unwrap();
            for ch in answer.chars() {
                out.write_u8(0).unwrap();
                wire::write_opt_string(&mut out, Some(&ch.to_string())).unwrap();
            }
        }
    }
    out
}

fn decode(buffer: &[u8]) -> Result<Crossword, CrosswordError> {
    puzzle_io::read_crossword(&mut Cursor::new(buffer))
}

#[test]
fn hand_assembled_stream_decodes() {
    let buffer = raw_stream(3, 1, 3, &[(1, 0, 0, "CAT")], &[]);
    let crossword = decode(&buffer).unwrap();
    assert_eq!(crossword.square_count(), 3);
    assert_eq!(crossword.cell_at(0, 2).map(Cell::chars), Some("T"));
}

#[test]
fn crossword_rejects_oversized_dimensions() {
    let buffer = raw_stream(u32::MAX, u32::MAX, 0, &[], &[]);
    assert!(matches!(decode(&buffer), Err(CrosswordError::Format(_))));

    let buffer = raw_stream(0, 5, 0, &[], &[]);
    assert!(matches!(decode(&buffer), Err(CrosswordError::Format(_))));
}

#[test]
fn crossword_rejects_overlapping_words() {
    let buffer = raw_stream(3, 1, 3, &[(1, 0, 0, "CA"), (2, 0, 1, "AT")], &[]);
    assert!(matches!(decode(&buffer), Err(CrosswordError::Format(_))));
}

#[test]
fn crossword_rejects_word_outside_grid() {
    let buffer = raw_stream(3, 3, 3, &[], &[(1, u32::MAX, 0, "CAT")]);
    assert!(matches!(decode(&buffer), Err(CrosswordError::Format(_))));
}

#[test]
fn crossword_rejects_wrong_square_count() {
    let buffer = raw_stream(3, 1, 4, &[(1, 0, 0, "CAT")], &[]);
    assert!(matches!(decode(&buffer), Err(CrosswordError::Format(_))));
}

#[test]
fn large_word_numbers_survive_round_trip() {
    let mut builder = CrosswordBuilder::new();
    builder.set_width(2).set_height(1);
    builder.add_word(WordBuilder::new(Direction::Across).number(70_000).hint("Big").answer("AT").build().unwrap());
    let original = builder.build().unwrap();

    let decoded = decode(&encode(&original)).unwrap();
    assert!(decoded.find_word(Direction::Across, 70_000).is_some());
    assert_eq!(decoded.hash(), original.hash());
}

fn played_state(crossword: &Crossword) -> ProgressState {
    let mut state = crossword.new_state();
    state.set_char_at(0, 0, Some("O".to_string()));
    state.set_char_at(0, 1, Some("KX".to_string()));
    state.set_char_at(1, 1, Some("Z".to_string()));
    state.set_flag_at(ProgressState::FLAG_MARKED, 1, 0, true);
    state.set_selection(Direction::Down, 2, 1);
    state.set_play_time_millis(65_000);
    state.set_last_played(1_700_000_123_000);
    crossword.update_state_statistics(&mut state).unwrap();
    state
}

fn state_round_trip(state: &ProgressState, version: u8) -> ProgressState {
    let mut buffer = Vec::new();
    state_io::write_state_version(&mut buffer, state, version).unwrap();
    state_io::read_state(&mut Cursor::new(&buffer)).unwrap()
}

#[test]
fn current_state_version_is_lossless() {
    let crossword = sample();
    let state = played_state(&crossword);
    assert_eq!(state.squares_unknown(), 1);

    let decoded = state_round_trip(&state, state_io::VERSION_CURRENT);
    assert_eq!(decoded, state);
}

#[test]
fn version_two_drops_unknown_counter() {
    let crossword = sample();
    let state = played_state(&crossword);
    let decoded = state_round_trip(&state, 2);

    assert_eq!(decoded.squares_unknown(), 0);
    assert_eq!(decoded.char_at(0, 1), Some("KX"));
    assert_eq!(decoded.packed_statistics(), state.packed_statistics());
    assert_eq!(decoded.packed_selection(), state.packed_selection());
    assert_eq!(decoded.play_time_millis(), 65_000);
}

#[test]
fn version_one_keeps_first_character_only() {
    let crossword = sample();
    let state = played_state(&crossword);
    let decoded = state_round_trip(&state, 1);

    assert_eq!(decoded.char_at(0, 0), Some("O"));
    assert_eq!(decoded.char_at(0, 1), Some("K"));
    assert_eq!(decoded.char_at(1, 0), None);
    assert!(decoded.is_flag_set(ProgressState::FLAG_MARKED, 1, 0));
    assert_eq!(decoded.last_played(), 1_700_000_123_000);
}

#[test]
fn unsupported_state_versions() {
    let state = ProgressState::new(1, 1);
    let mut buffer = Vec::new();
    assert!(matches!(
        state_io::write_state_version(&mut buffer, &state, 0),
        Err(CrosswordError::InvalidArgument(_))
    ));

    state_io::write_state(&mut buffer, &state).unwrap();
    buffer[4] = state_io::VERSION_CURRENT + 1;
    assert!(matches!(
        state_io::read_state(&mut Cursor::new(&buffer)),
        Err(CrosswordError::Format(_))
    ));
}

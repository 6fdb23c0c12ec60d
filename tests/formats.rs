use crossword_reader::crossword::codec::scramble;
use crossword_reader::crossword::format::{
    AmuseFormatter, CrosswordCompilerFormatter, CrosswordFormatter, DatFormatter, NytFormatter, PuzFormatter,
    PzzlFormatter, UClickFormatter, UClickJsonFormatter, WsjFormatter, puz,
};
use crossword_reader::crossword::{Cell, CrosswordBuilder, CrosswordError, FormatKind, read_puzzle, read_puzzle_with};
use crossword_reader::{Crossword, Direction};
use pretty_assertions::assert_eq;

/// Answers of a word, one string per square.
fn answer(crossword: &Crossword, direction: Direction, number: u32) -> Vec<String> {
    crossword
        .find_word(direction, number)
        .unwrap_or_else(|| panic!("missing {} {}", number, direction))
        .cells()
        .iter()
        .map(|c| c.chars().to_string())
        .collect()
}

fn hint(crossword: &Crossword, direction: Direction, number: u32) -> Option<&str> {
    crossword.find_word(direction, number).and_then(|w| w.hint())
}

// ----- .puz -----

struct PuzSection {
    tag: &'static [u8; 4],
    data: Vec<u8>,
}

/// Assembles a `.puz` file around `rows`, a grid using '.' for blocks.
fn puz_file(rows: &[Vec<u8>], clues: &[&str], puzzle_type: u16, checksum: u16, sections: &[PuzSection]) -> Vec<u8> {
    let width = rows[0].len();
    let height = rows.len();
    let mut out = Vec::new();
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(puz::MAGIC);
    out.extend_from_slice(&[0; 10]);
    out.extend_from_slice(b"1.3\0");
    out.extend_from_slice(&[0; 2]);
    out.extend_from_slice(&checksum.to_le_bytes());
    out.extend_from_slice(&[0; 12]);
    out.push(width as u8);
    out.push(height as u8);
    out.extend_from_slice(&(clues.len() as u16).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&puzzle_type.to_le_bytes());

    for row in rows {
        out.extend_from_slice(row);
    }
    for row in rows {
        out.extend(row.iter().map(|&b| if b == b'.' { b'.' } else { b'-' }));
    }
    for text in ["Mini", "Setter", "(c) Setter"].iter().chain(clues).chain(&["Notes here"]) {
        out.extend_from_slice(text.as_bytes());
        out.push(0);
    }
    for section in sections {
        out.extend_from_slice(section.tag);
        out.extend_from_slice(&(section.data.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&section.data);
        out.push(0);
    }
    out
}

fn mini_grid() -> Vec<Vec<u8>> {
    vec![b"CAT".to_vec(), b"A.E".to_vec()]
}

const MINI_CLUES: [&str; 3] = ["Feline", "Cal.", "Tea starter"];

#[test]
fn puz_plain_grid() {
    let file = puz_file(&mini_grid(), &MINI_CLUES, 1, 0, &[]);
    let crossword = read_puzzle(FormatKind::Puz, &file).unwrap();

    assert_eq!((crossword.width(), crossword.height()), (3, 2));
    assert_eq!(crossword.title(), Some("Mini"));
    assert_eq!(crossword.author(), Some("Setter"));
    assert_eq!(crossword.copyright(), Some("(c) Setter"));
    assert_eq!(crossword.comment(), Some("Notes here"));
    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["C", "A", "T"]);
    assert_eq!(answer(&crossword, Direction::Down, 1), vec!["C", "A"]);
    assert_eq!(answer(&crossword, Direction::Down, 2), vec!["T", "E"]);
    assert_eq!(hint(&crossword, Direction::Down, 2), Some("Tea starter"));
    assert_eq!(crossword.square_count(), 5);
    assert_eq!(crossword.flags(), 0);
}

#[test]
fn puz_extension_sections() {
    let mut circles = vec![0u8; 6];
    circles[5] = 0x80;
    let mut rebus = vec![0u8; 6];
    rebus[1] = 1;
    let sections = [
        PuzSection { tag: b"GEXT", data: circles },
        PuzSection { tag: b"GRBS", data: rebus },
        PuzSection { tag: b"RTBL", data: b" 0:ARE;".to_vec() },
        PuzSection { tag: b"LTIM", data: b"0,1".to_vec() },
    ];
    let file = puz_file(&mini_grid(), &MINI_CLUES, 1, 0, &sections);
    let crossword = read_puzzle(FormatKind::Puz, &file).unwrap();

    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["C", "ARE", "T"]);
    assert!(crossword.cell_at(1, 2).unwrap().is_circled());
    assert!(!crossword.cell_at(0, 2).unwrap().is_circled());
}

#[test]
fn puz_without_solution() {
    let file = puz_file(&mini_grid(), &MINI_CLUES, 2, 0, &[]);
    let crossword = read_puzzle(FormatKind::Puz, &file).unwrap();
    assert_eq!(crossword.flags() & Crossword::FLAG_NO_SOLUTION, Crossword::FLAG_NO_SOLUTION);
    assert!(crossword.cell_at(0, 0).unwrap().has_no_solution());
}

#[test]
fn puz_locked_with_known_key() {
    let original = mini_grid();
    let checksum = scramble::grid_checksum(&original);
    let mut locked = original.clone();
    scramble::scramble(&mut locked, 1234);
    let file = puz_file(&locked, &MINI_CLUES, 4, checksum, &[]);

    let crossword = read_puzzle_with(FormatKind::Puz, &file, None, Some(1234)).unwrap();
    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["C", "A", "T"]);
    assert_eq!(answer(&crossword, Direction::Down, 2), vec!["T", "E"]);

    let wrong = PuzFormatter::new().with_key(Some(1235)).unwrap();
    let mut builder = CrosswordBuilder::new();
    assert!(matches!(wrong.read(&mut builder, &file), Err(CrosswordError::KeyNotFound)));
}

#[test]
fn puz_locked_brute_force() {
    let original = mini_grid();
    let checksum = scramble::grid_checksum(&original);
    let mut locked = original.clone();
    scramble::scramble(&mut locked, 7);
    let file = puz_file(&locked, &MINI_CLUES, 4, checksum, &[]);

    let crossword = read_puzzle(FormatKind::Puz, &file).unwrap();
    assert_eq!(answer(&crossword, Direction::Down, 1), vec!["C", "A"]);
}

#[test]
fn puz_rejects_out_of_range_key() {
    assert!(matches!(
        PuzFormatter::new().with_key(Some(10_000)),
        Err(CrosswordError::InvalidArgument(_))
    ));
}

#[test]
fn puz_errors() {
    let file = puz_file(&mini_grid(), &MINI_CLUES, 1, 0, &[]);

    let mut bad_magic = file.clone();
    bad_magic[3] = b'X';
    assert!(matches!(read_puzzle(FormatKind::Puz, &bad_magic), Err(CrosswordError::Format(_))));

    assert!(matches!(read_puzzle(FormatKind::Puz, &file[..56]), Err(CrosswordError::Truncated(_))));

    let missing_clue = puz_file(&mini_grid(), &MINI_CLUES[..2], 1, 0, &[]);
    assert!(matches!(read_puzzle(FormatKind::Puz, &missing_clue), Err(CrosswordError::Format(_))));

    let sections = [
        PuzSection { tag: b"GRBS", data: vec![0, 2, 0, 0, 0, 0] },
        PuzSection { tag: b"RTBL", data: b" 0:ARE;".to_vec() },
    ];
    let bad_rebus = puz_file(&mini_grid(), &MINI_CLUES, 1, 0, &sections);
    assert!(matches!(read_puzzle(FormatKind::Puz, &bad_rebus), Err(CrosswordError::Format(_))));
}

#[test]
fn puz_rebus_table_index_limit() {
    // Stored keys are one less than their GRBS value
    let sections = [PuzSection { tag: b"RTBL", data: b"65535:CAT;".to_vec() }];
    let file = puz_file(&mini_grid(), &MINI_CLUES, 1, 0, &sections);
    assert!(matches!(read_puzzle(FormatKind::Puz, &file), Err(CrosswordError::Format(_))));

    let sections = [PuzSection { tag: b"RTBL", data: b"65534:CAT;".to_vec() }];
    let file = puz_file(&mini_grid(), &MINI_CLUES, 1, 0, &sections);
    assert!(read_puzzle(FormatKind::Puz, &file).is_ok());
}

// ----- Crossword Compiler -----

const COMPILER_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<crossword-compiler xmlns="http://crossword.info/xml/crossword-compiler">
  <rectangular-puzzle xmlns="http://crossword.info/xml/rectangular-puzzle" alphabet="ABCDEFGHIJKLMNOPQRSTUVWXYZ">
    <metadata>
      <title>Compiled</title>
      <creator>Setter</creator>
      <copyright>Setter 2024</copyright>
      <description>Tiny grid</description>
    </metadata>
    <crossword>
      <grid width="3" height="2">
        <cell x="1" y="1" solution="C" number="1" background-shape="circle"/>
        <cell x="2" y="1" solution="A"/>
        <cell x="3" y="1" solution="T" number="2"/>
        <cell x="1" y="2" solution="A"/>
        <cell x="2" y="2" type="block"/>
        <cell x="3" y="2" solution="E"/>
      </grid>
      <word id="3" x="3" y="1-2"/>
      <word id="1" x="1-3" y="1"/>
      <word id="2" x="1" y="1-2"/>
      <clues ordering="normal">
        <title><b>Across</b></title>
        <clue word="1" number="1" hint-url="https://example.com/cat">Feline</clue>
      </clues>
      <clues ordering="normal">
        <title><b>Down</b></title>
        <clue word="2" number="1" citation="Atlas">Cal. &amp; others</clue>
      </clues>
    </crossword>
  </rectangular-puzzle>
</crossword-compiler>"#;

#[test]
fn crossword_compiler_document() {
    let crossword = read_puzzle(FormatKind::CrosswordCompiler, COMPILER_DOCUMENT.as_bytes()).unwrap();

    assert_eq!(crossword.title(), Some("Compiled"));
    assert_eq!(crossword.author(), Some("Setter"));
    assert_eq!(crossword.copyright(), Some("Setter 2024"));
    assert_eq!(crossword.description(), Some("Tiny grid"));
    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["C", "A", "T"]);
    assert_eq!(hint(&crossword, Direction::Down, 1), Some("Cal. & others"));

    let across = crossword.find_word(Direction::Across, 1).unwrap();
    assert_eq!(across.hint_url(), Some("https://example.com/cat"));
    assert!(across.cell_at(0).unwrap().is_circled());
    assert_eq!(crossword.find_word(Direction::Down, 1).unwrap().citation(), Some("Atlas"));

    // No clue: numbered from its first grid cell
    let unclued = crossword.find_word(Direction::Down, 2).unwrap();
    assert_eq!(unclued.hint(), None);
    assert_eq!(answer(&crossword, Direction::Down, 2), vec!["T", "E"]);
}

#[test]
fn crossword_compiler_errors() {
    let unknown_word = COMPILER_DOCUMENT.replace(r#"<clue word="2""#, r#"<clue word="9""#);
    assert!(matches!(
        read_puzzle(FormatKind::CrosswordCompiler, unknown_word.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let ambiguous = COMPILER_DOCUMENT.replace(r#"<word id="1" x="1-3" y="1"/>"#, r#"<word id="1" x="1-3" y="1-2"/>"#);
    assert!(matches!(
        read_puzzle(FormatKind::CrosswordCompiler, ambiguous.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let mismatched = COMPILER_DOCUMENT.replace("</grid>", "</grad>");
    assert!(matches!(
        read_puzzle(FormatKind::CrosswordCompiler, mismatched.as_bytes()),
        Err(CrosswordError::FormatCause { .. })
    ));
}

#[test]
fn crossword_compiler_rejects_oversized_grid() {
    let oversized = COMPILER_DOCUMENT.replace(r#"<grid width="3" height="2">"#, r#"<grid width="2000000" height="2">"#);
    assert!(matches!(
        read_puzzle(FormatKind::CrosswordCompiler, oversized.as_bytes()),
        Err(CrosswordError::Format(_))
    ));
}

#[test]
fn crossword_compiler_rejects_negative_clue_number() {
    let negative = COMPILER_DOCUMENT.replace(r#"<clue word="1" number="1""#, r#"<clue word="1" number="-1""#);
    assert!(matches!(
        read_puzzle(FormatKind::CrosswordCompiler, negative.as_bytes()),
        Err(CrosswordError::Format(_))
    ));
}

// ----- UClick -----

const UCLICK_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<crossword>
  <Title v="Daily%20Mini"/>
  <Author v="By+Someone"/>
  <Copyright v="100%25 Uclick"/>
  <Width v="3"/>
  <Height v="2"/>
  <across>
    <a1 a="CAT" c="Feline%2C+informally" n="1" cn="1"/>
  </across>
  <down>
    <d1 a="CA" c="Golden+State+abbr." n="1" cn="1"/>
    <d2 a="TE" c="50% of a tee" n="3" cn="2"/>
  </down>
</crossword>"#;

#[test]
fn uclick_document() {
    let crossword = read_puzzle(FormatKind::UClick, UCLICK_DOCUMENT.as_bytes()).unwrap();

    assert_eq!(crossword.title(), Some("Daily Mini"));
    assert_eq!(crossword.author(), Some("By Someone"));
    assert_eq!(crossword.copyright(), Some("100% Uclick"));
    assert_eq!(hint(&crossword, Direction::Across, 1), Some("Feline, informally"));
    assert_eq!(hint(&crossword, Direction::Down, 2), Some("50% of a tee"));

    let down = crossword.find_word(Direction::Down, 2).unwrap();
    assert_eq!((down.start_row(), down.start_column()), (0, 2));
    assert_eq!(answer(&crossword, Direction::Down, 2), vec!["T", "E"]);
}

#[test]
fn uclick_word_before_width() {
    let document = r#"<crossword><Height v="2"/><across><a1 a="CAT" c="x" n="1" cn="1"/></across></crossword>"#;
    assert!(matches!(
        read_puzzle(FormatKind::UClick, document.as_bytes()),
        Err(CrosswordError::Format(_))
    ));
}

#[test]
fn uclick_invalid_number() {
    let document = UCLICK_DOCUMENT.replace(r#"cn="2""#, r#"cn="0""#);
    assert!(matches!(
        read_puzzle(FormatKind::UClick, document.as_bytes()),
        Err(CrosswordError::Format(_))
    ));
}

// ----- WSJ -----

const WSJ_DOCUMENT: &str = r#"{
  "data": {
    "copy": {
      "title": "WSJ Mini",
      "description": "Small one",
      "publisher": "Dow Jones",
      "byline": "Jane Doe",
      "date-publish": "Friday, 05 June 2015",
      "gridsize": { "cols": "3", "rows": 2 },
      "words": [
        { "id": 1, "x": "1-3", "y": 1 },
        { "id": 2, "x": 1, "y": "1-2" },
        { "id": "3", "x": "3", "y": "1-2" }
      ],
      "clues": [
        { "title": "Across", "clues": [ { "word": 1, "clue": "Feline", "number": "1" } ] },
        { "title": "Down", "clues": [
          { "word": 2, "clue": "Cal.", "number": 1 },
          { "word": "3", "clue": "Tea starter", "number": 2 }
        ] }
      ]
    },
    "grid": [
      [ { "Letter": "C" }, { "Letter": "A" }, { "Letter": "T" } ],
      [ { "Letter": "A" }, { "Letter": "" }, null ]
    ]
  }
}"#;

#[test]
fn wsj_document() {
    let document = WSJ_DOCUMENT.replace("null", r#"{ "Letter": "E" }"#);
    let crossword = read_puzzle(FormatKind::Wsj, document.as_bytes()).unwrap();

    assert_eq!(crossword.title(), Some("WSJ Mini"));
    assert_eq!(crossword.description(), Some("Small one"));
    assert_eq!(crossword.copyright(), Some("Dow Jones"));
    assert_eq!(crossword.author(), Some("Jane Doe"));
    assert_eq!(crossword.date(), 1_433_462_400_000);
    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["C", "A", "T"]);
    assert_eq!(answer(&crossword, Direction::Down, 2), vec!["T", "E"]);
    assert_eq!(hint(&crossword, Direction::Down, 1), Some("Cal."));
}

#[test]
fn wsj_null_square_is_a_block() {
    // Down 2 crosses the null square
    assert!(matches!(
        read_puzzle(FormatKind::Wsj, WSJ_DOCUMENT.as_bytes()),
        Err(CrosswordError::Format(_))
    ));
}

#[test]
fn wsj_errors() {
    let fixed = WSJ_DOCUMENT.replace("null", r#"{ "Letter": "E" }"#);

    let bad_date = fixed.replace("Friday, 05 June 2015", "yesterday");
    assert!(matches!(
        read_puzzle(FormatKind::Wsj, bad_date.as_bytes()),
        Err(CrosswordError::FormatCause { .. })
    ));

    let short_grid = fixed.replace(r#""rows": 2"#, r#""rows": 3"#);
    assert!(matches!(
        read_puzzle(FormatKind::Wsj, short_grid.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let negative = fixed.replace(r#""number": 2"#, r#""number": -2"#);
    assert!(matches!(
        read_puzzle(FormatKind::Wsj, negative.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    assert!(matches!(
        read_puzzle(FormatKind::Wsj, b"{ not json"),
        Err(CrosswordError::FormatCause { .. })
    ));
}

// ----- Dat -----

const DAT_DOCUMENT: &str = "3|2\nCATA+E\n1|Feline|Cal.|2||Tea starter|\nSmall|Tester\n";

#[test]
fn dat_document() {
    let crossword = read_puzzle(FormatKind::Dat, DAT_DOCUMENT.as_bytes()).unwrap();

    assert_eq!(crossword.title(), Some("Small"));
    assert_eq!(crossword.author(), Some("Tester"));
    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["C", "A", "T"]);
    assert_eq!(answer(&crossword, Direction::Down, 1), vec!["C", "A"]);
    assert_eq!(answer(&crossword, Direction::Down, 2), vec!["T", "E"]);
    assert_eq!(hint(&crossword, Direction::Down, 2), Some("Tea starter"));
}

#[test]
fn dat_errors() {
    let missing_hint = "3|2\nCATA+E\n1|Feline|Cal.|\nSmall|Tester\n";
    assert!(matches!(
        read_puzzle(FormatKind::Dat, missing_hint.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let unplaced_hint = "3|2\nCATA+E\n1|Feline|Cal.|2||Tea starter|3|Extra||\nSmall|Tester\n";
    assert!(matches!(
        read_puzzle(FormatKind::Dat, unplaced_hint.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let long_map = "3|1\nCATS\n";
    assert!(matches!(
        read_puzzle(FormatKind::Dat, long_map.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    assert!(matches!(
        read_puzzle(FormatKind::Dat, b"3|2\n"),
        Err(CrosswordError::Truncated(_))
    ));
}

#[test]
fn dat_rejects_oversized_grid() {
    assert!(matches!(
        read_puzzle(FormatKind::Dat, b"1|18446744073709551615\nC\n1|Letter||\n"),
        Err(CrosswordError::Format(_))
    ));
    assert!(matches!(
        read_puzzle(FormatKind::Dat, b"2000000|2000000\nC\n"),
        Err(CrosswordError::Format(_))
    ));
}

#[test]
fn dat_honors_encoding() {
    let document = "2|1\nÉT\n1|Summer in Paris||\nFrançais|Auteur\n";
    let (latin1, _, _) = encoding_rs::WINDOWS_1252.encode(document);

    let mut formatter = DatFormatter::new();
    formatter.set_encoding("ISO-8859-1").unwrap();
    let mut builder = CrosswordBuilder::new();
    formatter.read(&mut builder, &latin1).unwrap();
    let crossword = builder.build().unwrap();

    assert_eq!(crossword.title(), Some("Français"));
    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["É", "T"]);
}

// ----- Pzzl -----

fn pzzl_document(map: &[&str]) -> String {
    let mut lines = vec!["header", "", "meta", "", "Sectioned", "", "Author Name", "", "3", "", "2", "", "", ""];
    lines.extend_from_slice(map);
    lines.extend_from_slice(&["", "Feline", "Be", "", "Cal.", "Art", "Tea starter"]);
    lines.join("\n")
}

#[test]
fn pzzl_document_with_circles_and_rebus() {
    let document = pzzl_document(&["%C.A,R,T.T", "A.R.E"]);
    let crossword = read_puzzle(FormatKind::Pzzl, document.as_bytes()).unwrap();

    assert_eq!(crossword.title(), Some("Sectioned"));
    assert_eq!(crossword.author(), Some("Author Name"));
    assert_eq!((crossword.width(), crossword.height()), (3, 2));
    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["C", "ART", "T"]);
    assert_eq!(answer(&crossword, Direction::Across, 4), vec!["A", "R", "E"]);
    assert_eq!(answer(&crossword, Direction::Down, 2), vec!["ART", "R"]);
    assert_eq!(hint(&crossword, Direction::Down, 3), Some("Tea starter"));
    assert!(crossword.cell_at(0, 0).unwrap().is_circled());
    assert_eq!(crossword.cell_at(1, 1).map(Cell::chars), Some("R"));
}

#[test]
fn pzzl_errors() {
    let too_tall = pzzl_document(&["C.A.T", "A.R.E", "B.E.D"]);
    assert!(matches!(
        read_puzzle(FormatKind::Pzzl, too_tall.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let too_wide = pzzl_document(&["C.A.T", "A.R.E.S"]);
    assert!(matches!(
        read_puzzle(FormatKind::Pzzl, too_wide.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let no_height = pzzl_document(&["C.A.T", "A.R.E"]).replacen("\n2\n", "\n0\n", 1);
    assert!(matches!(
        read_puzzle(FormatKind::Pzzl, no_height.as_bytes()),
        Err(CrosswordError::Format(_))
    ));
}

#[test]
fn pzzl_rejects_oversized_height() {
    let document = pzzl_document(&["C.A.T", "A.R.E"]).replacen("\n2\n", "\n18446744073709551615\n", 1);
    assert!(matches!(
        read_puzzle(FormatKind::Pzzl, document.as_bytes()),
        Err(CrosswordError::Format(_))
    ));
}

#[test]
fn pzzl_width_counts_first_row_rebus_as_one_square() {
    let document = pzzl_document(&["C.A,R,T,S.T", "A.R.E"]);
    let crossword = read_puzzle(FormatKind::Pzzl, document.as_bytes()).unwrap();

    assert_eq!(crossword.width(), 3);
    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["C", "ARTS", "T"]);
    assert_eq!(answer(&crossword, Direction::Down, 3), vec!["T", "E"]);

    // A later row may not use the extra letters as columns
    let wider = pzzl_document(&["C.A,R,T,S.T", "A.R.E.S"]);
    assert!(matches!(
        read_puzzle(FormatKind::Pzzl, wider.as_bytes()),
        Err(CrosswordError::Format(_))
    ));
}

// ----- NYT -----

const NYT_DOCUMENT: &str = r#"{
  "body": [{
    "dimensions": { "width": 3, "height": 2 },
    "cells": [
      { "answer": "C", "type": 2 }, { "answer": "A", "type": 1 }, { "answer": "T", "type": 1 },
      { "answer": "A", "type": 1 }, {}, { "answer": "E", "type": 1 }
    ],
    "clues": [
      { "cells": [0, 1, 2], "direction": "Across", "label": "1", "text": [{ "plain": "Feline" }] },
      { "cells": [0, 3], "direction": "Down", "label": 1,
        "text": [{ "plain": "Cal. and Nev.", "formatted": "Cal. &amp; Nev." }] },
      { "cells": [2, 5], "direction": "Down", "label": 2, "text": [{ "plain": "Tea starter" }] }
    ]
  }],
  "constructors": ["Ann Author", "Bo Builder"],
  "copyright": "&copy; 2015",
  "notes": [{ "text": "Theme &quot;none&quot;" }],
  "publicationDate": "2015-10-20"
}"#;

#[test]
fn nyt_document() {
    let crossword = read_puzzle(FormatKind::Nyt, NYT_DOCUMENT.as_bytes()).unwrap();

    assert_eq!((crossword.width(), crossword.height()), (3, 2));
    assert_eq!(crossword.author(), Some("Ann Author, Bo Builder"));
    assert_eq!(crossword.copyright(), Some("© 2015"));
    assert_eq!(crossword.comment(), Some("Theme \"none\""));
    assert_eq!(crossword.date(), 1_445_299_200_000);
    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["C", "A", "T"]);
    assert_eq!(answer(&crossword, Direction::Down, 2), vec!["T", "E"]);
    assert_eq!(hint(&crossword, Direction::Down, 1), Some("Cal. & Nev."));
    assert_eq!(hint(&crossword, Direction::Across, 1), Some("Feline"));
    assert!(crossword.cell_at(0, 0).unwrap().is_circled());
    assert!(!crossword.cell_at(0, 1).unwrap().is_circled());
}

#[test]
fn nyt_errors() {
    let sideways = NYT_DOCUMENT.replace(r#""direction": "Across""#, r#""direction": "Diagonal""#);
    assert!(matches!(
        read_puzzle(FormatKind::Nyt, sideways.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let into_block = NYT_DOCUMENT.replace("[2, 5]", "[2, 4]");
    assert!(matches!(
        read_puzzle(FormatKind::Nyt, into_block.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let no_width = NYT_DOCUMENT.replace(r#""width": 3"#, r#""width": 0"#);
    assert!(matches!(
        read_puzzle(FormatKind::Nyt, no_width.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let bad_date = NYT_DOCUMENT.replace("2015-10-20", "20 Oct 2015");
    assert!(matches!(
        read_puzzle(FormatKind::Nyt, bad_date.as_bytes()),
        Err(CrosswordError::FormatCause { .. })
    ));
}

// ----- Amuse -----

const AMUSE_DOCUMENT: &str = r#"{
  "title": "Amused",
  "description": "",
  "copyright": "Amuse 2021",
  "author": "Setter",
  "w": 3,
  "h": 2,
  "publishTime": 1628395200000,
  "cellInfos": [ { "x": 2, "y": 1, "isCircled": true }, { "x": 0, "y": 0, "isCircled": false } ],
  "placedWords": [
    { "acrossNotDown": true, "clueNum": 1, "x": 0, "y": 0, "clue": { "clue": "Feline" }, "word": "CAT" },
    { "acrossNotDown": false, "clueNum": 1, "x": 0, "y": 0, "clue": { "clue": "Cal." }, "word": "CA" },
    { "acrossNotDown": false, "clueNum": 2, "x": 2, "y": 0, "clue": { "clue": "Tea starter" }, "word": "TE" }
  ]
}"#;

#[test]
fn amuse_document() {
    let crossword = read_puzzle(FormatKind::Amuse, AMUSE_DOCUMENT.as_bytes()).unwrap();

    assert_eq!(crossword.title(), Some("Amused"));
    assert_eq!(crossword.author(), Some("Setter"));
    assert_eq!(crossword.copyright(), Some("Amuse 2021"));
    assert_eq!(crossword.date(), 1_628_395_200_000);
    assert_eq!(answer(&crossword, Direction::Down, 2), vec!["T", "E"]);
    assert_eq!(hint(&crossword, Direction::Down, 1), Some("Cal."));
    assert!(crossword.cell_at(1, 2).unwrap().is_circled());
    assert!(!crossword.cell_at(0, 0).unwrap().is_circled());
}

#[test]
fn amuse_errors() {
    let overhanging = AMUSE_DOCUMENT.replace(r#""word": "TE""#, r#""word": "TEA""#);
    assert!(matches!(
        read_puzzle(FormatKind::Amuse, overhanging.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let negative = AMUSE_DOCUMENT.replace(r#""clueNum": 2"#, r#""clueNum": -2"#);
    assert!(matches!(
        read_puzzle(FormatKind::Amuse, negative.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let stray_circle = AMUSE_DOCUMENT.replace(r#""x": 2, "y": 1"#, r#""x": 5, "y": 1"#);
    assert!(matches!(
        read_puzzle(FormatKind::Amuse, stray_circle.as_bytes()),
        Err(CrosswordError::Format(_))
    ));
}

// ----- UClick JSON -----

const UCLICK_JSON_DOCUMENT: &str = r#"{
  "Width": "3",
  "Height": 2,
  "Title": "Uclick Mini",
  "Author": "Someone",
  "Copyright": "Uclick",
  "AcrossClue": "01|Feline",
  "DownClue": "01|Cal.
02|Tea starter
end
",
  "Solution": { "Line1": "CAT", "Line2": "A E" },
  "Layout": { "Line1": "010002", "Line2": "00-100" },
  "AllAnswer": "CATA-E"
}"#;

#[test]
fn uclick_json_document() {
    let crossword = read_puzzle(FormatKind::UClickJson, UCLICK_JSON_DOCUMENT.as_bytes()).unwrap();

    assert_eq!(crossword.title(), Some("Uclick Mini"));
    assert_eq!(crossword.author(), Some("Someone"));
    assert_eq!(answer(&crossword, Direction::Across, 1), vec!["C", "A", "T"]);
    assert_eq!(answer(&crossword, Direction::Down, 1), vec!["C", "A"]);
    assert_eq!(answer(&crossword, Direction::Down, 2), vec!["T", "E"]);
    assert_eq!(hint(&crossword, Direction::Down, 2), Some("Tea starter"));

    let down = crossword.find_word(Direction::Down, 2).unwrap();
    assert_eq!((down.start_row(), down.start_column()), (0, 2));
}

#[test]
fn uclick_json_errors() {
    let no_layout = UCLICK_JSON_DOCUMENT.replace(r#""Layout""#, r#""Outline""#);
    assert!(matches!(
        read_puzzle(FormatKind::UClickJson, no_layout.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let unplaced = UCLICK_JSON_DOCUMENT.replace("02|Tea starter", "03|Tea starter");
    assert!(matches!(
        read_puzzle(FormatKind::UClickJson, unplaced.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let zero_line = UCLICK_JSON_DOCUMENT.replace(r#""Line2": "A E""#, r#""Line0": "A E""#);
    assert!(matches!(
        read_puzzle(FormatKind::UClickJson, zero_line.as_bytes()),
        Err(CrosswordError::Format(_))
    ));

    let no_width = UCLICK_JSON_DOCUMENT.replace(r#""Width": "3""#, r#""Width": 0"#);
    assert!(matches!(
        read_puzzle(FormatKind::UClickJson, no_width.as_bytes()),
        Err(CrosswordError::Format(_))
    ));
}

// ----- dispatch -----

#[test]
fn format_kind_lookup() {
    assert_eq!(FormatKind::from_name("PUZ"), Some(FormatKind::Puz));
    assert_eq!(FormatKind::from_name("crossword-compiler"), Some(FormatKind::CrosswordCompiler));
    assert_eq!(FormatKind::from_name("uclick-json"), Some(FormatKind::UClickJson));
    assert_eq!(FormatKind::from_name("NYT"), Some(FormatKind::Nyt));
    assert_eq!(FormatKind::from_name("nope"), None);
    assert_eq!(FormatKind::from_extension("daily.jpz"), Some(FormatKind::CrosswordCompiler));
    assert_eq!(FormatKind::from_extension("mini.PZZL"), Some(FormatKind::Pzzl));
    assert_eq!(FormatKind::from_extension("notes.txt"), None);
}

#[test]
fn format_kind_sniffing() {
    let file = puz_file(&mini_grid(), &MINI_CLUES, 1, 0, &[]);
    assert_eq!(FormatKind::sniff(&file), Some(FormatKind::Puz));
    assert_eq!(FormatKind::sniff(COMPILER_DOCUMENT.as_bytes()), Some(FormatKind::CrosswordCompiler));
    assert_eq!(FormatKind::sniff(UCLICK_DOCUMENT.as_bytes()), Some(FormatKind::UClick));
    assert_eq!(FormatKind::sniff(WSJ_DOCUMENT.as_bytes()), Some(FormatKind::Wsj));
    assert_eq!(FormatKind::sniff(NYT_DOCUMENT.as_bytes()), Some(FormatKind::Nyt));
    assert_eq!(FormatKind::sniff(AMUSE_DOCUMENT.as_bytes()), Some(FormatKind::Amuse));
    assert_eq!(FormatKind::sniff(UCLICK_JSON_DOCUMENT.as_bytes()), Some(FormatKind::UClickJson));
    assert_eq!(FormatKind::sniff(DAT_DOCUMENT.as_bytes()), None);
}

#[test]
fn readers_are_read_only() {
    let crossword = read_puzzle(FormatKind::Dat, DAT_DOCUMENT.as_bytes()).unwrap();
    let mut sink = Vec::new();

    assert!(!PuzFormatter::new().can_write());
    assert!(CrosswordCompilerFormatter::new().can_read());
    assert!(matches!(
        UClickFormatter::new().write(&crossword, &mut sink),
        Err(CrosswordError::Unsupported(_))
    ));
    assert!(matches!(
        WsjFormatter::new().write(&crossword, &mut sink),
        Err(CrosswordError::Unsupported(_))
    ));
    for result in [
        NytFormatter::new().write(&crossword, &mut sink),
        AmuseFormatter::new().write(&crossword, &mut sink),
        UClickJsonFormatter::new().write(&crossword, &mut sink),
    ] {
        assert!(matches!(result, Err(CrosswordError::Unsupported(_))));
    }
    assert!(matches!(
        PzzlFormatter::new().set_encoding("no-such-encoding"),
        Err(CrosswordError::InvalidArgument(_))
    ));
}

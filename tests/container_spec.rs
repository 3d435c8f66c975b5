use std::fs::File;
use std::io::Cursor;

use dictfile::dict::format::codecs::EntrySourceCodec;
use dictfile::{
    list_status, write_list, DictError, Dictionary, DictionaryBuilder, DictionaryMeta,
    EntryListKind, EntryRef, EntrySource, FormatVersion, Index, Pair, PairEntry, TextEntry,
    TokenRow,
};

fn pair(lang1: &str, lang2: &str) -> Pair {
    Pair {
        lang1: lang1.to_string(),
        lang2: lang2.to_string(),
    }
}

fn pair_ref(position: u32) -> EntryRef {
    EntryRef {
        kind: EntryListKind::Pair,
        position,
    }
}

fn text_ref(position: u32) -> EntryRef {
    EntryRef {
        kind: EntryListKind::Text,
        position,
    }
}

/// The EN-DE scenario: one source, 3 pair entries, 1 text entry, 1 index.
fn sample_builder() -> DictionaryBuilder {
    let mut builder = DictionaryBuilder::new("EN-DE");
    builder.add_source(EntrySource {
        name: "wiktionary".to_string(),
        entry_count: 4,
    });
    builder.add_pair_entry(PairEntry {
        source: 0,
        pairs: vec![pair("dog", "Hund")],
    });
    builder.add_pair_entry(PairEntry {
        source: 0,
        pairs: vec![pair("cat", "Katze"), pair("cat", "Kater")],
    });
    builder.add_pair_entry(PairEntry {
        source: 0,
        pairs: vec![pair("house", "Haus")],
    });
    builder.add_text_entry(TextEntry {
        source: 0,
        text: "dog: a domesticated canid".to_string(),
    });

    let mut index = Index::new("EN", "English -> German");
    index.main_token_count = Some(3);
    index.token_rows = vec![
        TokenRow {
            token: "cat".to_string(),
            entries: vec![pair_ref(1)],
        },
        TokenRow {
            token: "dog".to_string(),
            entries: vec![pair_ref(0), text_ref(0)],
        },
        TokenRow {
            token: "house".to_string(),
            entries: vec![pair_ref(2)],
        },
    ];
    builder.add_index(index);
    builder
}

fn to_bytes(builder: &DictionaryBuilder) -> Vec<u8> {
    let mut bytes = Vec::new();
    builder.write(&mut bytes).expect("write dictionary");
    bytes
}

fn open_bytes(bytes: Vec<u8>) -> dictfile::Result<Dictionary<Cursor<Vec<u8>>>> {
    Dictionary::open(Cursor::new(bytes))
}

/// Byte offset where the pair-entry list starts, derived from the header
/// and the serialized sources section.
fn pair_list_start(builder: &DictionaryBuilder) -> usize {
    let header = 4 + 8 + 4 + builder.info.len();
    let mut sources_bytes = Vec::new();
    write_list(&mut sources_bytes, &builder.sources, &EntrySourceCodec).expect("write sources");
    header + sources_bytes.len()
}

#[test]
fn round_trip_preserves_every_element() {
    let builder = sample_builder();
    let dict = open_bytes(to_bytes(&builder)).expect("open");

    assert_eq!(dict.version, builder.version);
    assert_eq!(dict.created_millis, builder.created_millis);
    assert_eq!(dict.info, "EN-DE");
    assert_eq!(*dict.sources, builder.sources);

    assert_eq!(dict.pair_entries.len(), builder.pair_entries.len());
    for (i, expected) in builder.pair_entries.iter().enumerate() {
        assert_eq!(&dict.pair_entries.get(i).unwrap(), expected);
    }
    assert_eq!(dict.text_entries.len(), builder.text_entries.len());
    for (i, expected) in builder.text_entries.iter().enumerate() {
        assert_eq!(&dict.text_entries.get(i).unwrap(), expected);
    }
    assert_eq!(dict.indices.len(), 1);
    assert_eq!(&dict.indices.get(0).unwrap(), &builder.indices[0]);
}

#[test]
fn concrete_scenario_sizes_and_lookup() {
    let dict = open_bytes(to_bytes(&sample_builder())).expect("open");

    assert_eq!(dict.pair_entries.len(), 3);
    let second = dict.pair_entries.get(1).unwrap();
    assert_eq!(second.pairs.len(), 2);
    assert_eq!(second.pairs[0].lang2, "Katze");

    let index = dict.indices.get(0).unwrap();
    assert_eq!(index.main_token_count, Some(3));
    let refs = index.lookup("dog");
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0], pair_ref(0));
    assert_eq!(refs[1], text_ref(0));
    assert!(index.lookup("zebra").is_empty());
}

#[test]
fn trailing_garbage_beyond_the_sentinel_is_ignored() {
    let mut bytes = to_bytes(&sample_builder());
    bytes.push(0xAB);
    let dict = open_bytes(bytes).expect("open with trailing garbage");
    assert_eq!(dict.pair_entries.len(), 3);
}

#[test]
fn truncating_the_last_byte_is_corruption() {
    let mut bytes = to_bytes(&sample_builder());
    bytes.truncate(bytes.len() - 1);
    let err = open_bytes(bytes).unwrap_err();
    assert!(matches!(err, DictError::Corrupt(_)), "got {:?}", err);
}

#[test]
fn truncating_before_the_sentinel_is_corruption() {
    let mut bytes = to_bytes(&sample_builder());
    // The sentinel is a 4-byte length prefix plus 17 bytes of text; cut the
    // file one byte short of where it begins.
    bytes.truncate(bytes.len() - (4 + "END OF DICTIONARY".len()) - 1);
    let err = open_bytes(bytes).unwrap_err();
    assert!(matches!(err, DictError::Corrupt(_)), "got {:?}", err);
}

#[test]
fn flipping_a_byte_in_the_offset_table_is_corruption() {
    let builder = sample_builder();
    let mut bytes = to_bytes(&builder);
    // First offset-table entry of the pair list sits right after its count.
    let table_byte = pair_list_start(&builder) + 4;
    bytes[table_byte] ^= 0x80;
    let err = open_bytes(bytes).unwrap_err();
    assert!(matches!(err, DictError::Corrupt(_)), "got {:?}", err);
}

#[test]
fn corrupt_element_bytes_surface_on_get_not_on_open() {
    let builder = sample_builder();
    let mut bytes = to_bytes(&builder);
    // Element data for pair entry 0 starts after the count and the
    // count + 1 offset entries; smash a byte inside its first string.
    let data_start = pair_list_start(&builder) + 4 + 8 * (builder.pair_entries.len() + 1);
    bytes[data_start + 10] = 0xFF;

    // Entry lists are lazy: the container opens fine without decoding them.
    let dict = open_bytes(bytes).expect("open with corrupt element");
    let err = dict.pair_entries.get(0).unwrap_err();
    assert!(matches!(err, DictError::Corrupt(_)), "got {:?}", err);
    // Unaffected elements still decode.
    assert_eq!(dict.pair_entries.get(2).unwrap().pairs[0].lang2, "Haus");
}

#[test]
fn unknown_version_is_rejected_from_the_version_field_alone() {
    // Four bytes only: if anything past the version field were consumed,
    // this would fail with an I/O error instead.
    let bytes = vec![0, 0, 0, 99];
    let err = open_bytes(bytes).unwrap_err();
    assert!(matches!(err, DictError::UnsupportedVersion(99)), "got {:?}", err);
}

#[test]
fn version_zero_files_omit_token_counts() {
    let builder = sample_builder().with_version(FormatVersion::V0);
    let dict = open_bytes(to_bytes(&builder)).expect("open v0");
    assert_eq!(dict.version, FormatVersion::V0);
    let index = dict.indices.get(0).unwrap();
    assert_eq!(index.main_token_count, None);
    assert_eq!(index.token_count(), 3);
    // Entries are unaffected by the version gate.
    assert_eq!(dict.pair_entries.get(1).unwrap().pairs[1].lang2, "Kater");
}

#[test]
fn debug_output_reports_sizes_without_decoding_entries() {
    let dict = open_bytes(to_bytes(&sample_builder())).expect("open");
    let rendered = format!("{:?}", dict);
    assert!(rendered.contains("info: \"EN-DE\""), "got {}", rendered);
    assert!(rendered.contains("pair_entries: 3"), "got {}", rendered);
    assert!(rendered.contains("indices: 1"), "got {}", rendered);
}

#[test]
fn default_index_round_trips_once_its_token_count_is_set() {
    // A freshly created index carries no main token count; writing it in a
    // v1 container must fail loudly rather than substitute a value that
    // would read back different from what was written.
    let mut builder = sample_builder();
    builder.indices[0].main_token_count = None;
    let mut sink = Vec::new();
    let err = builder.write(&mut sink).unwrap_err();
    assert!(matches!(err, DictError::Corrupt(_)), "got {:?}", err);

    builder.indices[0].main_token_count = Some(3);
    let dict = open_bytes(to_bytes(&builder)).expect("open");
    assert_eq!(&dict.indices.get(0).unwrap(), &builder.indices[0]);
}

#[test]
fn builder_rejects_dangling_index_references() {
    let mut builder = sample_builder();
    builder.indices[0].token_rows[0].entries.push(pair_ref(99));
    let mut sink = Vec::new();
    let err = builder.write(&mut sink).unwrap_err();
    assert!(matches!(err, DictError::Corrupt(_)), "got {:?}", err);
}

#[test]
fn builder_rejects_dangling_source_references() {
    let mut builder = sample_builder();
    builder.add_text_entry(TextEntry {
        source: 7,
        text: "orphan".to_string(),
    });
    let mut sink = Vec::new();
    let err = builder.write(&mut sink).unwrap_err();
    assert!(matches!(err, DictError::Corrupt(_)), "got {:?}", err);
}

#[test]
fn builder_rejects_unsorted_index_tokens() {
    let mut builder = sample_builder();
    builder.indices[0].token_rows.reverse();
    let mut sink = Vec::new();
    let err = builder.write(&mut sink).unwrap_err();
    assert!(matches!(err, DictError::Corrupt(_)), "got {:?}", err);
}

#[test]
fn small_cache_still_serves_every_entry() {
    let bytes = to_bytes(&sample_builder());
    let dict = Dictionary::open_with_cache(Cursor::new(bytes), 1).expect("open");
    // Walk the list twice; every access past the single cached slot decodes
    // from the file again and must still agree.
    for _ in 0..2 {
        for i in 0..dict.pair_entries.len() {
            assert!(!dict.pair_entries.get(i).unwrap().pairs.is_empty());
        }
    }
    assert_eq!(dict.pair_entries.get(0).unwrap().pairs[0].lang1, "dog");
}

#[test]
fn on_disk_round_trip_through_the_catalog() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("en-de.dict");
    let builder = sample_builder();
    {
        let mut file = File::create(&path).expect("create");
        builder.write(&mut file).expect("write");
    }

    let meta = DictionaryMeta::new("EN-DE", &path);
    assert!(meta.is_readable_on_disk());
    assert_eq!(
        list_status(&[meta.clone()]),
        vec![("EN-DE".to_string(), true)]
    );

    let dict = meta.open().expect("open via catalog");
    assert_eq!(dict.info, "EN-DE");
    assert_eq!(dict.pair_entries.len(), 3);
    assert_eq!(
        dict.text_entries.get(0).unwrap().text,
        "dog: a domesticated canid"
    );

    let missing = DictionaryMeta::new("EN-DE", dir.path().join("missing.dict"));
    assert!(!missing.is_readable_on_disk());
}

#[test]
fn empty_sections_round_trip() {
    let builder = DictionaryBuilder::new("empty");
    let dict = open_bytes(to_bytes(&builder)).expect("open empty");
    assert!(dict.sources.is_empty());
    assert_eq!(dict.pair_entries.len(), 0);
    assert_eq!(dict.text_entries.len(), 0);
    assert_eq!(dict.indices.len(), 0);
}

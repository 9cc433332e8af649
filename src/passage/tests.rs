use super::*;
use crate::model::{AnswerOption, QuestionRecord};

fn detector() -> PassageDetector {
    PassageDetector::new().expect("passage regexes compile")
}

fn question(number: u32, body: &str, start: usize, end: usize) -> QuestionRecord {
    QuestionRecord {
        number,
        body: body.to_string(),
        options: vec![
            AnswerOption {
                ordinal: 1,
                marker: '①',
                text: "가".to_string(),
                is_correct: false,
            },
            AnswerOption {
                ordinal: 2,
                marker: '②',
                text: "나".to_string(),
                is_correct: false,
            },
        ],
        passage_id: None,
        has_table: false,
        source_offsets: SourceOffsets { start, end },
    }
}

fn passage(id: u32, start: usize) -> Passage {
    Passage {
        id,
        content: format!("passage {}", id),
        range: SourceOffsets {
            start,
            end: start + 10,
        },
        has_image: false,
        has_table: false,
        source: PassageSource::Sentinel,
    }
}

#[test]
fn matched_sentinel_pair_is_captured_and_unmatched_one_is_not() {
    let text = "<!-- passage:1 -->\n봄이 오면 꽃이 핀다.\n<!-- /passage:1 -->\n<!-- passage:2 -->\n끝나지 않는 지문\n1. 윗글의 내용과 일치하는 것은?\n① 가 ② 나\n";

    let passages = detector().detect(text);

    assert_eq!(passages.len(), 1);
    assert_eq!(passages[0].id, 1);
    assert_eq!(passages[0].content, "봄이 오면 꽃이 핀다.");
    assert_eq!(passages[0].source, PassageSource::Sentinel);
    assert_eq!(passages[0].range.start, 0);
}

#[test]
fn mismatched_close_id_yields_no_capture() {
    let text = "<!-- passage:1 -->\n본문\n<!-- /passage:2 -->\n";

    assert!(detector().detect(text).is_empty());
}

#[test]
fn reused_sentinel_id_is_not_captured_twice() {
    let text = "<!-- passage:1 -->\n첫 지문\n<!-- /passage:1 -->\n<!-- passage:1 -->\n둘째 지문\n<!-- /passage:1 -->\n<!-- passage:3 -->\n셋째 지문\n<!-- /passage:3 -->\n";

    let passages = detector().detect(text);

    let contents = passages
        .iter()
        .map(|passage| passage.content.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(contents, vec!["첫 지문", "셋째 지문"]);
    assert_eq!(passages[1].id, 2);
}

#[test]
fn cue_passage_stops_at_blank_line() {
    let text = "[1~2] 다음 글을 읽고 물음에 답하시오.\n\n바람이 분다.\n잎이 흔들린다.\n\n1. 윗글에 대한 설명으로 옳은 것은?\n① 가 ② 나\n";

    let passages = detector().detect(text);

    assert_eq!(passages.len(), 1);
    assert_eq!(passages[0].content, "바람이 분다.\n잎이 흔들린다.");
    assert_eq!(passages[0].source, PassageSource::Cue);
    assert_eq!(&text[passages[0].range.start..passages[0].range.start + 3], "바");
}

#[test]
fn cue_passage_stops_at_question_number_or_marker() {
    let by_question = "다음을 읽고 답하시오.\n철수는 학교에 갔다.\n2. 철수가 간 곳은?\n① 학교 ② 집\n";
    let by_marker = "1. 다음 자료를 보고 물음에 답하시오.\n물가가 올랐다. ① 상승 ② 하락\n";

    let first = detector().detect(by_question);
    let second = detector().detect(by_marker);

    assert_eq!(first.len(), 1);
    assert_eq!(first[0].content, "철수는 학교에 갔다.");
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].content, "물가가 올랐다.");
}

#[test]
fn duplicate_content_across_passes_is_kept_once() {
    let text = "다음 글을 읽고 답하시오.\n<!-- passage:1 -->\n같은 내용\n<!-- /passage:1 -->\n";
    let detector = detector();

    let passages = detector.detect(text);

    // The cue capture includes the sentinel markup, so contents differ.
    assert_eq!(passages.len(), 2);

    let plain = "다음 글을 읽고 답하시오.\n같은 내용\n\n<!-- passage:1 -->\n같은 내용\n<!-- /passage:1 -->\n";
    let deduped = detector.detect(plain);
    assert_eq!(deduped.len(), 1);
    assert_eq!(deduped[0].source, PassageSource::Sentinel);
    assert_eq!(deduped[0].id, 1);
}

#[test]
fn image_and_table_flags_follow_markdown_syntax() {
    let text = "<!-- passage:1 -->\n![그림 1](fig1.png)\n| 구분 | 값 |\n| --- | --- |\n| 가 | 1 |\n<!-- /passage:1 -->\n<!-- passage:2 -->\n그림 없는 지문\n<!-- /passage:2 -->\n";

    let passages = detector().detect(text);

    assert_eq!(passages.len(), 2);
    assert!(passages[0].has_image);
    assert!(passages[0].has_table);
    assert!(!passages[1].has_image);
    assert!(!passages[1].has_table);
}

#[test]
fn short_question_inherits_and_long_question_resets() {
    let passages = vec![passage(1, 0)];
    let short_body = "가".repeat(40);
    let long_body = "나".repeat(300);
    let mut questions = vec![
        question(1, "윗글의 내용과 일치하는 것은?", 20, 60),
        question(2, &short_body, 60, 120),
        question(3, &long_body, 120, 900),
        question(4, &short_body, 900, 960),
    ];

    let attached = PassageAssociator::default().associate(&mut questions, &passages);

    assert_eq!(questions[0].passage_id, Some(1));
    assert_eq!(questions[1].passage_id, Some(1));
    assert_eq!(questions[2].passage_id, None);
    assert_eq!(questions[3].passage_id, None);
    assert_eq!(attached, 2);
}

#[test]
fn cue_picks_latest_passage_starting_before_question_end() {
    let passages = vec![passage(1, 0), passage(2, 500), passage(3, 2_000)];
    let mut questions = vec![
        question(1, "윗글의 주제로 가장 적절한 것은?", 100, 200),
        question(2, "다음 글을 읽고 물음에 답하시오. 위 글의 내용으로 옳은 것은?", 450, 900),
    ];

    PassageAssociator::new(100).associate(&mut questions, &passages);

    assert_eq!(questions[0].passage_id, Some(1));
    assert_eq!(questions[1].passage_id, Some(2));
}

#[test]
fn cue_without_preceding_passage_leaves_question_unattached() {
    let passages = vec![passage(1, 5_000)];
    let mut questions = vec![question(1, "윗글에 대한 설명으로 옳은 것은?", 0, 100)];

    let attached = PassageAssociator::default().associate(&mut questions, &passages);

    assert_eq!(attached, 0);
    assert_eq!(questions[0].passage_id, None);
}

#[test]
fn has_cue_recognises_read_and_back_reference_phrases() {
    assert!(PassageAssociator::has_cue("다음 지문을 읽고 답하시오."));
    assert!(PassageAssociator::has_cue("위의 글에서 밑줄 친 부분은?"));
    assert!(!PassageAssociator::has_cue("다음 중 옳은 것은?"));
}

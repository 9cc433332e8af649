use super::*;

fn segmenter() -> Segmenter {
    Segmenter::new().expect("segmenter regexes compile")
}

#[test]
fn block_with_three_markers_yields_three_ordered_options() {
    let text = "1. 다음 중 수도가 서울인 나라는?\n① 대한민국 ② 일본 ③ 중국\n";

    let outcome = segmenter().segment(text);

    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.skipped.is_empty());
    let record = &outcome.records[0];
    assert_eq!(record.number, 1);
    assert_eq!(record.body, "다음 중 수도가 서울인 나라는?");
    let ordinals = record
        .options
        .iter()
        .map(|option| option.ordinal)
        .collect::<Vec<u8>>();
    assert_eq!(ordinals, vec![1, 2, 3]);
    assert_eq!(record.options[0].text, "대한민국");
    assert_eq!(record.options[2].text, "중국");
    assert_eq!(record.options[1].marker, '②');
}

#[test]
fn block_with_single_marker_is_skipped_with_reason() {
    let text = "1. 다음 빈칸에 알맞은 말을 쓰시오.\n① 정답만 쓰시오\n2. 다음 중 옳은 것은?\n① 가 ② 나\n";

    let outcome = segmenter().segment(text);

    assert_eq!(outcome.blocks_scanned, 2);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].number, 2);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].number, 1);
    assert_eq!(
        outcome.skipped[0].reason,
        SkipReason::TooFewOptions { found: 1 }
    );
}

#[test]
fn repeated_marker_keeps_last_text_and_counts_once() {
    let text = "3. 옳은 것은?\n① 첫째 ② 둘째 ① 다시 첫째\n";

    let outcome = segmenter().segment(text);

    let record = &outcome.records[0];
    assert_eq!(record.options.len(), 2);
    assert_eq!(record.options[0].ordinal, 1);
    assert_eq!(record.options[0].text, "다시 첫째");
    assert_eq!(record.options[1].text, "둘째");
}

#[test]
fn repeated_single_marker_does_not_make_a_record() {
    let text = "4. 옳은 것은?\n① 하나 ① 또 하나\n";

    let outcome = segmenter().segment(text);

    assert!(outcome.records.is_empty());
    assert_eq!(
        outcome.skipped[0].reason,
        SkipReason::TooFewOptions { found: 1 }
    );
}

#[test]
fn preamble_before_first_question_is_ignored() {
    let text = "2024학년도 대학수학능력시험 문제지\n국어 영역\n\n1. 옳은 것은?\n① 가 ② 나\n";

    let outcome = segmenter().segment(text);

    assert_eq!(outcome.blocks_scanned, 1);
    assert_eq!(outcome.records[0].number, 1);
    assert_eq!(outcome.records[0].source_offsets.start, text.find("1.").unwrap_or(0));
    assert_eq!(outcome.records[0].source_offsets.end, text.len());
}

#[test]
fn source_offsets_cover_each_block() {
    let text = "1. 첫 문제?\n① 가 ② 나\n12. 둘째 문제?\n① 다 ② 라\n";

    let outcome = segmenter().segment(text);

    assert_eq!(outcome.records.len(), 2);
    let second_start = text.find("12.").expect("second question present");
    assert_eq!(outcome.records[0].source_offsets.start, 0);
    assert_eq!(outcome.records[0].source_offsets.end, second_start);
    assert_eq!(outcome.records[1].number, 12);
    assert_eq!(outcome.records[1].source_offsets.start, second_start);
}

#[test]
fn four_digit_numbers_do_not_open_a_question() {
    let text = "1. 다음 글을 보고 답하시오.\n2024. 3. 1 기준 자료\n① 가 ② 나\n";

    let outcome = segmenter().segment(text);

    assert_eq!(outcome.blocks_scanned, 1);
    assert!(outcome.records[0].body.contains("2024. 3. 1 기준 자료"));
}

#[test]
fn footer_noise_is_removed_and_whitespace_collapsed() {
    let text = "5. 다음   설명으로\n옳은 것은?\n2024학년도 6월 모의평가 문제지\n- 3 -\n①  가나   다 ② 라\n";

    let outcome = segmenter().segment(text);

    let record = &outcome.records[0];
    assert_eq!(record.body, "다음 설명으로 옳은 것은?");
    assert_eq!(record.options[0].text, "가나 다");
}

#[test]
fn sub_item_lines_stay_on_their_own_line() {
    let text = "6. <보기>에서 옳은 것만을 있는 대로 고른 것은?\nㄱ: 물은 100도에서 끓는다.\nㄴ: 얼음은 물에 뜬다.\n① ㄱ ② ㄴ ③ ㄱ, ㄴ\n";

    let outcome = segmenter().segment(text);

    let lines = outcome.records[0].body.lines().collect::<Vec<&str>>();
    assert_eq!(
        lines,
        vec![
            "<보기>에서 옳은 것만을 있는 대로 고른 것은?",
            "ㄱ: 물은 100도에서 끓는다.",
            "ㄴ: 얼음은 물에 뜬다.",
        ]
    );
}

#[test]
fn last_option_stops_at_blank_line() {
    let text = "7. 옳은 것은?\n① 가 ② 나\n\n[8~9] 다음 글을 읽고 물음에 답하시오.\n";

    let outcome = segmenter().segment(text);

    assert_eq!(outcome.records[0].options[1].text, "나");
}

#[test]
fn table_like_body_is_rendered_as_markdown_grid() {
    let text = "8. 다음 [표]에 대한 설명으로 옳은 것은?\n구분    장점    단점\n풍력    무공해    소음\n태양광    무한함    날씨 영향\n① 가 ② 나\n";

    let outcome = segmenter().segment(text);

    let record = &outcome.records[0];
    assert!(record.has_table);
    let lines = record.body.lines().collect::<Vec<&str>>();
    assert_eq!(lines[0], "다음 [표]에 대한 설명으로 옳은 것은?");
    assert_eq!(lines[1], "| 구분 | 장점 | 단점 |");
    assert_eq!(lines[2], "| --- | --- | --- |");
    assert_eq!(lines[3], "| 풍력 | 무공해 | 소음 |");
    assert_eq!(lines[4], "| 태양광 | 무한함 | 날씨 영향 |");
}

#[test]
fn one_weak_indicator_is_not_table_like() {
    assert!(!is_table_like("다음 내용을 읽고"));
    assert!(is_table_like("구분과 특징을 비교"));
    assert!(is_table_like("<표> 참고"));
}

#[test]
fn single_table_row_falls_back_to_prose() {
    let noise = NoisePatterns::new().expect("noise regexes compile");
    let cell_split = Regex::new(r"\t+|\s{2,}").expect("cell split compiles");
    let lines = vec!["구분    내용", "설명이 이어진다"];

    let (body_lines, grid_emitted) = reconstruct_table_lines(&lines, &cell_split, &noise);

    assert!(!grid_emitted);
    assert_eq!(render_body_lines(&body_lines), "구분 내용 설명이 이어진다");
}

#[test]
fn grid_rows_are_padded_to_widest_row() {
    let noise = NoisePatterns::new().expect("noise regexes compile");
    let cell_split = Regex::new(r"\t+|\s{2,}").expect("cell split compiles");
    let lines = vec!["구분  장점  단점", "가|나  빠름"];

    let (body_lines, grid_emitted) = reconstruct_table_lines(&lines, &cell_split, &noise);

    assert!(grid_emitted);
    assert_eq!(
        render_body_lines(&body_lines),
        "| 구분 | 장점 | 단점 |\n| --- | --- | --- |\n| 가\\|나 | 빠름 |  |"
    );
}

#[test]
fn option_text_stops_at_passage_sentinel() {
    let text = "1. 다음 중 옳은 것은?\n① 가나다\n② 라마바\n<!-- passage:1 -->\n봄이 오면 꽃이 핀다.\n<!-- /passage:1 -->\n2. 윗글의 중심 소재는?\n① 꽃 ② 바다\n";

    let outcome = segmenter().segment(text);

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].options[1].text, "라마바");
    assert_eq!(outcome.records[1].body, "윗글의 중심 소재는?");
}

#[test]
fn marker_ordinals_are_fixed() {
    assert_eq!(marker_ordinal('①'), Some(1));
    assert_eq!(marker_ordinal('⑤'), Some(5));
    assert_eq!(marker_ordinal('⑥'), None);
    assert_eq!(ordinal_marker(3), Some('③'));
    assert_eq!(ordinal_marker(0), None);
    assert_eq!(ordinal_marker(6), None);
}

#[test]
fn answer_key_marks_correct_option_and_reports_misses() {
    let text = "1. 옳은 것은?\n① 가 ② 나\n2. 옳은 것은?\n① 다 ② 라\n";
    let mut outcome = segmenter().segment(text);
    let answer_key = AnswerKey::from([(1, 2), (2, 5)]);

    let unmatched = apply_answer_key(&mut outcome.records, &answer_key);

    assert_eq!(unmatched, vec![2]);
    assert!(outcome.records[0].options[1].is_correct);
    assert!(!outcome.records[0].options[0].is_correct);
    assert!(outcome.records[1].options.iter().all(|option| !option.is_correct));
}

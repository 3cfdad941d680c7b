//! Plain-text rendering of a stored question paper.
//!
//! The layout is fixed: a header block, then `PART A` (10 slots), `PART B`
//! (8 slots) and `PART C` (2 slots) numbered continuously. Slots without a
//! stored question are printed as a bare number. Output depends only on the
//! paper's fields.

use crate::paper::{PART_A_CAPACITY, PART_B_CAPACITY, PART_C_CAPACITY, QuestionPaper};

const RULE: &str =
  "------------------------------------------------------------------------";

/// Append `s` followed by a newline.
fn line(out: &mut String, s: &str) {
  out.push_str(s);
  out.push('\n');
}

pub fn render_question_paper(paper: &QuestionPaper) -> String {
  let m = &paper.metadata;
  let mut out = String::new();

  line(&mut out, &m.exam_name.to_uppercase());
  line(&mut out, &format!("Department of {}", m.department));
  line(&mut out, &format!("Semester: {}    Regulation: {}", m.semester, m.regulation));
  line(&mut out, &format!("Subject: {} - {}", m.subject_code, m.subject_title));
  line(&mut out, &format!("Time: {}    Maximum Marks: {}", m.time, m.max_marks));
  line(&mut out, RULE);

  let sections = [
    ("PART A", &paper.part_a, PART_A_CAPACITY),
    ("PART B", &paper.part_b, PART_B_CAPACITY),
    ("PART C", &paper.part_c, PART_C_CAPACITY),
  ];

  let mut number = 1;
  for (label, questions, capacity) in sections {
    out.push('\n');
    line(&mut out, label);
    out.push('\n');
    for slot in 0..capacity {
      match questions.get(slot) {
        Some(text) => line(&mut out, &format!("{number:>2}. {}", text.trim())),
        None => line(&mut out, &format!("{number:>2}.")),
      }
      number += 1;
    }
  }

  out.push('\n');
  line(&mut out, RULE);
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::paper::tests::paper;

  #[test]
  fn sections_are_numbered_continuously() {
    let text = render_question_paper(&paper());

    let a = text.find("PART A").unwrap();
    let b = text.find("PART B").unwrap();
    let c = text.find("PART C").unwrap();
    assert!(a < b && b < c);

    assert!(text.contains(" 1. A question 1\n"));
    assert!(text.contains("10. A question 10\n"));
    assert!(text.contains("11. B question 1\n"));
    assert!(text.contains("18. B question 8\n"));
    assert!(text.contains("19. C question 1\n"));
    assert!(text.contains("20. C question 2\n"));
  }

  #[test]
  fn header_carries_stored_fields() {
    let text = render_question_paper(&paper());
    assert!(text.starts_with("END SEMESTER EXAMINATION\n"));
    assert!(text.contains("Subject: CS101 - Programming"));
    assert!(text.contains("Time: 3 Hours    Maximum Marks: 100"));
  }

  #[test]
  fn short_sections_leave_blank_slots() {
    let mut p = paper();
    p.part_a = vec!["Only one".into()];
    let text = render_question_paper(&p);
    assert!(text.contains(" 1. Only one\n"));
    assert!(text.contains(" 2.\n"));
    assert!(text.contains("10.\n"));
    assert!(text.contains("11. B question 1\n"));
  }

  #[test]
  fn output_is_deterministic() {
    let p = paper();
    assert_eq!(render_question_paper(&p), render_question_paper(&p.clone()));
  }
}

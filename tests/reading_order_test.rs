//! Reading-order properties checked end to end through the layout engine.

use std::collections::HashSet;

use reflow::layout::{column_for, merge_inline, Diagnostics, LayoutEngine, LayoutOptions};
use reflow::model::{
    BBox, Block, Document, DocumentInput, Fragment, FragmentInput, MediaInput, MediaKind,
    PageInput,
};
use reflow::Thresholds;

fn line(text: &str, left: f32, top: f32, width: f32) -> FragmentInput {
    FragmentInput::new(text, left, top, width, 10.0).with_size(10.0)
}

fn run(pages: Vec<PageInput>) -> Document {
    let options = LayoutOptions::default().with_parallel(false);
    LayoutEngine::new(options)
        .process(DocumentInput::new(pages))
        .unwrap()
}

/// Full-width heading, ten lines in each of two columns, full-width footnote.
fn two_column_page() -> PageInput {
    let mut page = PageInput::new(1, 600.0, 800.0).with_fragment(line(
        "A heading that spans the whole page.",
        50.0,
        120.0,
        510.0,
    ));
    for i in 0..10 {
        let top = 160.0 + i as f32 * 12.0;
        let (left_text, right_text) = if i == 9 {
            ("the left column stops here.", "the right column stops here.")
        } else {
            ("words of the left column go", "words of the right column go")
        };
        page = page
            .with_fragment(line(left_text, 50.0, top, 230.0))
            .with_fragment(line(right_text, 310.0, top, 250.0));
    }
    page.with_fragment(line(
        "A footnote that spans the page width.",
        50.0,
        300.0,
        510.0,
    ))
}

#[test]
fn test_column_ids_in_range() {
    let doc = run(vec![two_column_page()]);
    let page = &doc.pages[0];
    assert!(page.is_multi_column());
    let columns = page.columns.len() as u32;

    for para in page.paragraphs() {
        for frag in &para.fragments {
            let col = frag.column.expect("every fragment has a column");
            assert!(col <= columns, "column {} out of range", col);
        }
    }
}

#[test]
fn test_paragraphs_share_no_fragments() {
    let doc = run(vec![two_column_page()]);
    let page = &doc.pages[0];

    let mut seen = HashSet::new();
    for para in page.paragraphs() {
        let first = para.first();
        for frag in &para.fragments {
            assert_eq!(frag.column_id(), first.column_id());
            assert_eq!(frag.block_id(), first.block_id());
            assert!(frag.constituents.contains(&frag.source));
            for &source in &frag.constituents {
                assert!(seen.insert((frag.page, source)), "fragment {} reused", source);
            }
        }
    }
    // 1 heading + 20 column lines + 1 footnote
    assert_eq!(seen.len(), 22);
}

#[test]
fn test_hello_world_merges() {
    let mut fragments = vec![
        Fragment::new(1, 0, "Hello ", BBox::new(0.0, 100.0, 40.0, 12.0)),
        Fragment::new(1, 1, "World", BBox::new(42.0, 100.0, 38.0, 12.0)),
    ];
    let mut diag = Diagnostics::default();
    merge_inline(&mut fragments, &LayoutOptions::default(), &mut diag);

    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].text, "Hello World");
    assert_eq!(fragments[0].bbox.left, 0.0);
    assert_eq!(fragments[0].bbox.right(), 80.0);
    assert_eq!(diag.inline_merges, 1);
}

#[test]
fn test_line_end_hyphen_joins_word() {
    let page = PageInput::new(1, 600.0, 800.0)
        .with_fragment(line("The inter-", 50.0, 200.0, 500.0))
        .with_fragment(line("national order holds.", 50.0, 212.0, 300.0));
    let doc = run(vec![page]);

    let paragraphs: Vec<_> = doc.pages[0].paragraphs().collect();
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].text(), "The international order holds.");
    assert_eq!(doc.diagnostics.dehyphenations, 1);
}

#[test]
fn test_column_for_examples() {
    let t = Thresholds::default();
    let starts = [50.0, 300.0];
    let span = |left: f32, right: f32| {
        Fragment::new(1, 0, "x", BBox::from_corners(left, 100.0, right, 110.0))
    };

    assert_eq!(column_for(&span(40.0, 580.0), &starts, 600.0, &t), 0);
    assert_eq!(column_for(&span(55.0, 280.0), &starts, 600.0, &t), 1);
    assert_eq!(column_for(&span(310.0, 570.0), &starts, 600.0, &t), 2);
}

#[test]
fn test_two_columns_with_heading_and_footnote() {
    let doc = run(vec![two_column_page()]);
    let page = &doc.pages[0];

    let mut blocks: Vec<(u32, u32)> = page
        .elements
        .iter()
        .map(|b| (b.reading_block(), b.column()))
        .collect();
    blocks.dedup();
    assert_eq!(blocks, vec![(1, 0), (2, 1), (3, 2), (4, 0)]);
    assert_eq!(page.reading_block_count(), 4);

    let text = page.plain_text();
    let heading = text.find("heading").unwrap();
    let left = text.find("left column stops").unwrap();
    let right = text.find("right column stops").unwrap();
    let footnote = text.find("footnote").unwrap();
    assert!(heading < left && left < right && right < footnote);
}

#[test]
fn test_figure_follows_its_caption() {
    let page = PageInput::new(1, 600.0, 800.0)
        .with_fragment(line("Body text opens the page and", 50.0, 200.0, 500.0))
        .with_fragment(line("keeps running across the line", 50.0, 212.0, 500.0))
        .with_fragment(line("until the first part ends.", 50.0, 224.0, 200.0))
        .with_fragment(line("Figure 2.1: Page layout.", 50.0, 236.0, 150.0))
        .with_fragment(line("More body text follows the", 50.0, 248.0, 500.0))
        .with_fragment(line("caption and the page ends.", 50.0, 260.0, 200.0))
        .with_media(MediaInput::new(
            "fig-2-1",
            MediaKind::Figure,
            BBox::new(100.0, 450.0, 300.0, 150.0),
        ));
    let doc = run(vec![page]);
    let elements = &doc.pages[0].elements;

    assert_eq!(elements.len(), 4);
    let Block::Paragraph(caption) = &elements[1] else {
        panic!("expected the caption paragraph second");
    };
    assert!(caption.text().starts_with("Figure 2.1"));
    assert_eq!(caption.caption_for.as_deref(), Some("fig-2-1"));

    let Block::Media(figure) = &elements[2] else {
        panic!("expected the figure right after its caption");
    };
    assert_eq!(figure.id, "fig-2-1");
    assert!(figure.position.unwrap().caption_anchored);
    assert_eq!(figure.caption, Some(1));

    assert!(elements[3].is_paragraph());
    assert_eq!(doc.diagnostics.captions_not_found, 0);
    assert_eq!(doc.diagnostics.caption_links, 1);
}

#[test]
fn test_paragraph_continues_on_next_page() {
    let first = PageInput::new(1, 600.0, 800.0)
        .with_fragment(line("This paragraph starts on the first", 50.0, 200.0, 500.0))
        .with_fragment(line("page and goes on for a while and", 50.0, 212.0, 500.0))
        .with_fragment(line("continues on the", 50.0, 224.0, 500.0));
    let second = PageInput::new(2, 600.0, 800.0)
        .with_fragment(line("next page. It keeps going", 50.0, 200.0, 500.0))
        .with_fragment(line("with a few more words.", 50.0, 212.0, 200.0));
    let doc = run(vec![first, second]);

    let paragraphs: Vec<_> = doc.pages[0].paragraphs().collect();
    assert_eq!(paragraphs.len(), 1);
    let text = paragraphs[0].text();
    assert!(text.contains("continues on the next page."), "{}", text);
    assert!(text.ends_with("with a few more words."));
    assert!(paragraphs[0].is_continued());
    assert_eq!(doc.pages[1].paragraphs().count(), 0);
    assert_eq!(doc.diagnostics.cross_page_merges, 1);
}

#[test]
fn test_capitalized_page_start_does_not_merge() {
    let first = PageInput::new(1, 600.0, 800.0)
        .with_fragment(line("A paragraph that ends without a", 50.0, 200.0, 500.0))
        .with_fragment(line("final stop", 50.0, 212.0, 500.0));
    let second = PageInput::new(2, 600.0, 800.0)
        .with_fragment(line("Chapter 2 opens here.", 50.0, 200.0, 200.0));
    let doc = run(vec![first, second]);

    assert_eq!(doc.pages[1].paragraphs().count(), 1);
    assert_eq!(doc.diagnostics.cross_page_merges, 0);
}

#[test]
fn test_sentence_runs_from_left_column_into_right() {
    let mut page = PageInput::new(1, 600.0, 800.0).with_fragment(line(
        "A heading that spans the whole page.",
        50.0,
        120.0,
        510.0,
    ));
    for i in 0..10 {
        let top = 160.0 + i as f32 * 12.0;
        let left_text = if i == 9 {
            "the left column runs on into"
        } else {
            "words of the left column go"
        };
        let right_text = match i {
            0 => "the right column without a",
            9 => "the right column stops here.",
            _ => "words of the right column go",
        };
        page = page
            .with_fragment(line(left_text, 50.0, top, 230.0))
            .with_fragment(line(right_text, 310.0, top, 250.0));
    }
    let page = page.with_fragment(line(
        "A footnote that spans the page width.",
        50.0,
        300.0,
        510.0,
    ));
    let doc = run(vec![page]);
    let page = &doc.pages[0];

    let paragraphs: Vec<_> = page.paragraphs().collect();
    assert_eq!(paragraphs.len(), 3);
    let body = paragraphs[1].text();
    assert!(
        body.contains("runs on into the right column without a"),
        "{}",
        body
    );
    assert!(body.ends_with("the right column stops here."));
    assert_eq!(paragraphs[1].fragments.len(), 20);
    assert!(paragraphs[2].text().starts_with("A footnote"));
}

#[test]
fn test_paragraph_runs_across_three_pages() {
    let first = PageInput::new(1, 600.0, 800.0)
        .with_fragment(line("This paragraph starts on the first", 50.0, 200.0, 500.0))
        .with_fragment(line("page and then continues on the", 50.0, 212.0, 500.0));
    let second = PageInput::new(2, 600.0, 800.0)
        .with_fragment(line("second page and still goes on", 50.0, 200.0, 500.0))
        .with_fragment(line("without stopping to the", 50.0, 212.0, 500.0));
    let third = PageInput::new(3, 600.0, 800.0)
        .with_fragment(line("third page where it ends.", 50.0, 200.0, 200.0));
    let doc = run(vec![first, second, third]);

    let counts: Vec<usize> = doc.pages.iter().map(|p| p.paragraphs().count()).collect();
    assert_eq!(counts, vec![1, 0, 0]);

    let paragraph = doc.pages[0].paragraphs().next().unwrap();
    let text = paragraph.text();
    assert!(text.contains("continues on the second page"), "{}", text);
    assert!(text.contains("to the third page where it ends."), "{}", text);
    let pages: HashSet<u32> = paragraph.fragments.iter().map(|f| f.page).collect();
    assert_eq!(pages.len(), 3);
    assert_eq!(doc.diagnostics.cross_page_merges, 2);
}

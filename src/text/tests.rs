// src/text/tests.rs

use super::headless_font_driver::{CELL_HEIGHT, CELL_WIDTH};
use super::*;
use crate::color::Color;
use crate::geometry::{HAlign, Rect, VAlign};
use crate::render::{RenderContext, Target};
use crate::surface::OffscreenSurface;
use test_log::test;

const BG: Color = Color::rgb(0, 0, 255);

fn renderer() -> OutlineTextRenderer<HeadlessFontDriver> {
    OutlineTextRenderer::new(HeadlessFontDriver::new(), &[]).unwrap()
}

fn canvas(ctx: &RenderContext, w: u32, h: u32) -> OffscreenSurface {
    let mut s = OffscreenSurface::allocate_blank(ctx, w, h).unwrap();
    s.clear(BG);
    s
}

#[test]
fn empty_text_draws_nothing() {
    let ctx = RenderContext::new();
    let mut s = canvas(&ctx, 10, 10);
    let stats = ctx.stats();
    let textures = ctx.texture_count();

    let width = renderer().write_line(&mut s, "", 1, 1, HAlign::Left, VAlign::Top);

    assert_eq!(width, 0);
    assert_eq!(ctx.stats(), stats);
    assert_eq!(ctx.texture_count(), textures);
}

#[test]
fn outline_surrounds_white_fill() {
    let ctx = RenderContext::new();
    let mut s = canvas(&ctx, 40, 20);

    let width = renderer().write_line(&mut s, "A", 5, 5, HAlign::Left, VAlign::Top);

    assert_eq!(width, CELL_WIDTH as i32);
    assert_eq!(s.pixel(7, 8), Some(Color::WHITE));
    assert_eq!(s.pixel(5, 5), Some(Color::WHITE));
    assert_eq!(s.pixel(4, 5), Some(Color::BLACK));
    assert_eq!(s.pixel(10, 5), Some(Color::BLACK));
    assert_eq!(s.pixel(5, 4), Some(Color::BLACK));
    assert_eq!(s.pixel(5, 15), Some(Color::BLACK));
    assert_eq!(s.pixel(4, 4), Some(BG));
    assert_eq!(s.pixel(11, 8), Some(BG));
}

#[test]
fn right_bottom_anchor() {
    let ctx = RenderContext::new();
    let mut s = canvas(&ctx, 40, 20);

    let width = renderer().write_line(&mut s, "AB", 20, 10, HAlign::Right, VAlign::Bottom);

    assert_eq!(width, 12);
    assert_eq!(s.pixel(8, 0), Some(Color::WHITE));
    assert_eq!(s.pixel(18, 9), Some(Color::WHITE));
    assert_eq!(s.pixel(19, 0), Some(Color::BLACK));
    assert_eq!(s.pixel(21, 0), Some(BG));
}

#[test]
fn center_middle_anchor() {
    let ctx = RenderContext::new();
    let mut s = canvas(&ctx, 40, 40);

    renderer().write_line(&mut s, "AB", 20, 20, HAlign::Center, VAlign::Middle);

    // Block starts at (14, 15).
    assert_eq!(s.pixel(14, 15), Some(Color::WHITE));
    assert_eq!(s.pixel(13, 15), Some(Color::BLACK));
    assert_eq!(s.pixel(14, 14), Some(Color::BLACK));
}

#[test]
fn intermediate_textures_are_released_and_target_restored() {
    let ctx = RenderContext::new();
    let mut s = canvas(&ctx, 40, 20);
    let before = ctx.target();
    let textures = ctx.texture_count();

    renderer().write_line(&mut s, "hello", 0, 0, HAlign::Left, VAlign::Top);

    assert_eq!(ctx.texture_count(), textures);
    assert_eq!(ctx.target(), before);
}

#[test]
fn width_is_measured_without_drawing() {
    let ctx = RenderContext::new();
    let r = renderer();
    let stats = ctx.stats();
    assert_eq!(r.text_width("abc"), 18);
    assert_eq!(r.text_width(""), 0);
    assert_eq!(ctx.stats(), stats);
    assert_eq!(r.line_spacing(), CELL_HEIGHT as i32);
}

#[test]
fn multi_line_text_advances_by_line_spacing() {
    let ctx = RenderContext::new();
    let mut s = canvas(&ctx, 40, 40);

    let widest = renderer().write(&mut s, "A\nBB", 2, 2, HAlign::Left, VAlign::Top);

    assert_eq!(widest, 12);
    assert_eq!(s.pixel(2, 2), Some(Color::WHITE));
    assert_eq!(s.pixel(8, 2), Some(BG));
    assert_eq!(s.pixel(8, 12), Some(Color::WHITE));
}

#[test]
fn multi_line_bottom_alignment_covers_the_block() {
    let ctx = RenderContext::new();
    let mut s = canvas(&ctx, 40, 40);

    renderer().write(&mut s, "A\nA", 2, 30, HAlign::Left, VAlign::Bottom);

    assert_eq!(s.pixel(2, 10), Some(Color::WHITE));
    assert_eq!(s.pixel(2, 29), Some(Color::WHITE));
    assert_eq!(s.pixel(2, 30), Some(Color::BLACK));
}

#[test]
fn headless_glyph_cells_leave_a_gap() {
    let driver = HeadlessFontDriver::new();
    let run = driver.rasterize(&(), "a b", Color::WHITE).unwrap();
    assert_eq!((run.width, run.height), (18, CELL_HEIGHT));
    assert_eq!(run.pixels[0], Color::WHITE);
    assert_eq!(run.pixels[5], Color::TRANSPARENT);
    assert_eq!(run.pixels[8], Color::TRANSPARENT, "space has no ink");
    assert_eq!(run.pixels[12], Color::WHITE);
}

#[test]
fn text_honours_destination_clip() {
    let ctx = RenderContext::new();
    let mut s = canvas(&ctx, 40, 20);
    s.set_clip_rect(Rect::new(0, 0, 8, 20));
    renderer().write_line(&mut s, "AB", 5, 5, HAlign::Left, VAlign::Top);
    assert_eq!(s.pixel(7, 8), Some(Color::WHITE));
    assert_eq!(s.pixel(12, 8), Some(BG));
    assert_eq!(ctx.target(), Target::Window);
}

#[test]
fn upload_failure_reports_width_and_leaves_canvas_alone() {
    // Glyph runs for "AB" are 12x10, over the texture limit; the canvas is not.
    let ctx = RenderContext::with_max_texture_size(8);
    let mut s = canvas(&ctx, 8, 8);
    let before = s.snapshot();
    let target = ctx.target();
    let textures = ctx.texture_count();

    let width = renderer().write_line(&mut s, "AB", 0, 0, HAlign::Left, VAlign::Top);

    assert_eq!(width, 2 * CELL_WIDTH as i32);
    assert_eq!(s.snapshot(), before);
    assert_eq!(ctx.texture_count(), textures);
    assert_eq!(ctx.target(), target);
}

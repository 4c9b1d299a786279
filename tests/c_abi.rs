use std::ffi::CStr;
use std::ptr;

use imageutil_rust::ffi::{convert_to_grayscale, grayscale_result_name};

fn run(input: &[u8], width: i32, height: i32, output: &mut [u8]) -> i32 {
    unsafe { convert_to_grayscale(input.as_ptr(), width, height, output.as_mut_ptr(), output.len()) }
}

#[test]
fn red_2x2_converts_to_gray_76() {
    let input = [255u8, 0, 0, 255].repeat(4);
    let mut output = vec![0u8; input.len()];

    assert_eq!(run(&input, 2, 2, &mut output), 0);
    for px in output.chunks_exact(4) {
        assert!((px[0] as i32 - 76).abs() <= 2);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[0], px[2]);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn transparent_black_stays_zero() {
    let input = vec![0u8; 4 * 4 * 4];
    let mut output = vec![0x55u8; input.len()];

    assert_eq!(run(&input, 4, 4, &mut output), 0);
    assert!(output.iter().all(|&v| v == 0));
}

#[test]
fn white_pixel_stays_white() {
    let input = [255u8; 4];
    let mut output = [0u8; 4];

    assert_eq!(run(&input, 1, 1, &mut output), 0);
    assert_eq!(output, [255, 255, 255, 255]);
}

#[test]
fn error_codes_follow_check_order() {
    let input = [0u8; 16];
    let mut output = [0u8; 16];

    // null beats bad dimensions
    let code = unsafe { convert_to_grayscale(ptr::null(), 0, 0, output.as_mut_ptr(), 0) };
    assert_eq!(code, 1);
    // bad dimensions beat capacity
    let code = unsafe { convert_to_grayscale(input.as_ptr(), 0, 2, output.as_mut_ptr(), 0) };
    assert_eq!(code, 2);
    assert_eq!(run(&input, 2, 2, &mut output[..15]), 3);
    assert_eq!(run(&input, 2, 2, &mut output), 0);
}

#[test]
fn result_names_are_static_c_strings() {
    let name = |code| unsafe { CStr::from_ptr(grayscale_result_name(code)) }.to_str().ok();
    assert_eq!(name(1), Some("ERR_NULL_BUFFER"));
    assert_eq!(name(2), Some("ERR_INVALID_DIMENSIONS"));
    assert_eq!(name(4), Some("ERR_EXCEPTION"));
    assert_eq!(name(-7), Some("ERR_UNKNOWN"));
}

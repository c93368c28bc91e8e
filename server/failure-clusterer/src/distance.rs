//! Sift4 approximate edit distance.
//!
//! Walks both strings in lockstep; on a mismatch it searches up to
//! `max_offset` characters ahead in either string for a resync point, and
//! counts transpositions among matched runs. Runs in O(n * max_offset) per
//! comparison, so long signatures whose differences are farther apart than
//! the window score as larger distances than true Levenshtein would.
//!
//! Distances are over Unicode scalar values, not bytes.

pub const DEFAULT_MAX_OFFSET: usize = 100;

#[derive(Debug, Clone, Copy)]
struct Offset {
  c1: isize,
  c2: isize,
  trans: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sift4 {
  max_offset: usize,
}

impl Default for Sift4 {
  fn default() -> Self {
    Self::new(DEFAULT_MAX_OFFSET)
  }
}

impl Sift4 {
  pub fn new(max_offset: usize) -> Self {
    Self { max_offset }
  }

  pub fn max_offset(&self) -> usize {
    self.max_offset
  }

  pub fn distance(&self, a: &str, b: &str) -> usize {
    let s1: Vec<char> = a.chars().collect();
    let s2: Vec<char> = b.chars().collect();
    self.distance_chars(&s1, &s2)
  }

  fn distance_chars(&self, s1: &[char], s2: &[char]) -> usize {
    if s1.is_empty() {
      return s2.len();
    }
    if s2.is_empty() {
      return s1.len();
    }

    let l1 = s1.len() as isize;
    let l2 = s2.len() as isize;
    let max_offset = self.max_offset as isize;

    let mut c1: isize = 0;
    let mut c2: isize = 0;
    let mut lcss: isize = 0;
    let mut local_cs: isize = 0;
    let mut trans: isize = 0;
    let mut offsets: Vec<Offset> = Vec::new();

    while c1 < l1 && c2 < l2 {
      if s1[c1 as usize] == s2[c2 as usize] {
        local_cs += 1;
        let mut is_trans = false;
        let mut i = 0;
        while i < offsets.len() {
          let ofs = offsets[i];
          if c1 <= ofs.c1 || c2 <= ofs.c2 {
            is_trans = (c2 - c1).abs() >= (ofs.c2 - ofs.c1).abs();
            if is_trans {
              trans += 1;
            } else if !ofs.trans {
              offsets[i].trans = true;
              trans += 1;
            }
            break;
          } else if c1 > ofs.c2 && c2 > ofs.c1 {
            offsets.remove(i);
          } else {
            i += 1;
          }
        }
        offsets.push(Offset {
          c1,
          c2,
          trans: is_trans,
        });
      } else {
        lcss += local_cs;
        local_cs = 0;
        if c1 != c2 {
          c1 = c1.min(c2);
          c2 = c1;
        }
        let mut i: isize = 0;
        while i < max_offset && (c1 + i < l1 || c2 + i < l2) {
          if c1 + i < l1 && c2 < l2 && s1[(c1 + i) as usize] == s2[c2 as usize] {
            c1 += i - 1;
            c2 -= 1;
            break;
          }
          if c2 + i < l2 && c1 < l1 && s1[c1 as usize] == s2[(c2 + i) as usize] {
            c1 -= 1;
            c2 += i - 1;
            break;
          }
          i += 1;
        }
      }
      c1 += 1;
      c2 += 1;
      if c1 >= l1 || c2 >= l2 {
        lcss += local_cs;
        local_cs = 0;
        c1 = c1.min(c2);
        c2 = c1;
      }
    }
    lcss += local_cs;

    (l1.max(l2) - lcss + trans).max(0) as usize
  }
}

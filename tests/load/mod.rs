mod concurrent_matching;
